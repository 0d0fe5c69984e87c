//! Common test utilities

#![allow(dead_code)]

use chrono::NaiveDate;
use policy_tracker::config::{Config, CrawlJob, SourceConfig};
use policy_tracker::crawler::SourceKind;
use policy_tracker::models::ReportRecord;

/// One listing row: (ROC date label, title, relative detail link)
pub type Row<'a> = (&'a str, &'a str, &'a str);

/// Listing page in the Control Yuan table layout
pub fn control_yuan_listing(rows: &[Row<'_>]) -> String {
    let body: String = rows
        .iter()
        .map(|(date, title, href)| {
            format!(
                r#"<tr><td><span>{date}</span></td><td class="title"><a href="{href}">{title}</a></td></tr>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head><meta charset="big5"><title>調查報告</title></head>
<body>
<table class="table-list">
<thead><tr><th>日期</th><th>標題</th></tr></thead>
<tbody>{body}</tbody>
</table>
</body>
</html>"#
    )
}

/// Listing page in the NHRC card layout
pub fn nhrc_listing(rows: &[Row<'_>]) -> String {
    let body: String = rows
        .iter()
        .map(|(date, title, href)| {
            format!(
                r#"<div class="area-essay message">
                    <a href="{href}">
                        <div class="label"><ul><li><i class="mark">{date}</i></li></ul></div>
                        <div class="caption"><span>{title}</span></div>
                    </a>
                </div>"#
            )
        })
        .collect();

    format!("<html><body><div class=\"list\">{body}</div></body></html>")
}

/// Control Yuan detail page with the given paragraphs
pub fn control_yuan_detail(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<html><body>
<div class="area-essay">導覽列</div>
<div class="area-essay page-caption-p">{body}</div>
</body></html>"#
    )
}

/// Configuration pointing the Control Yuan profile at a mock server
pub fn mock_config(server_uri: &str, page_count: u32) -> Config {
    let mut config = Config {
        source: SourceConfig {
            kind: SourceKind::ControlYuan,
            listing_url: Some(format!(
                "{server_uri}/News.aspx?page={{page}}&PageSize={{page_size}}"
            )),
            base_url: Some(format!("{server_uri}/")),
            page_size: None,
        },
        ..Config::default()
    };
    config.schedule.page_count = page_count;
    config.crawler.rate_limit = 1000.0;
    config.crawler.request_timeout_secs = 5;
    config.crawler.retry_base_delay_ms = 10;
    config
}

/// Job snapshot for `config`
pub fn job(config: &Config) -> CrawlJob {
    config.job()
}

/// ROC date `112-5-3` as stored
pub fn may_3_2023() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, 3).unwrap()
}

pub fn record(title: &str, date: NaiveDate, url: &str) -> ReportRecord {
    ReportRecord {
        title: title.to_string(),
        date,
        url: url.to_string(),
        content: "既有內容".to_string(),
    }
}
