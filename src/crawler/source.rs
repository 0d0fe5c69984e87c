//! Source site profiles
//!
//! A profile is the fixed contract with one announcement site: where its
//! listing pages live, how its markup is laid out, and which table its
//! records go to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::config::SourceConfig;
use crate::parser::SelectorSpec;
use crate::utils::error::ParseError;

/// Built-in announcement sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Control Yuan investigation reports
    #[default]
    ControlYuan,
    /// National Human Rights Commission statements
    Nhrc,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControlYuan => "control-yuan",
            Self::Nhrc => "nhrc",
        }
    }

    /// The built-in profile for this source
    pub fn profile(&self) -> SourceProfile {
        match self {
            Self::ControlYuan => SourceProfile {
                kind: *self,
                listing_url_template: "https://www.cy.gov.tw/News.aspx?_CSN=129&n=792&page={page}&PageSize={page_size}&sms=8912&Create=1".to_string(),
                base_url: "https://www.cy.gov.tw/".to_string(),
                page_size: 100,
                selectors: SelectorSpec::new("table tbody tr", "span", "a", "a[href]"),
                content_selector: "div.area-essay.page-caption-p".to_string(),
                table: TableSpec::new("control_yuan_reports", "content"),
            },
            Self::Nhrc => SourceProfile {
                kind: *self,
                listing_url_template: "https://nhrc.cy.gov.tw/News4.aspx?n=9772&sms=12362&_CSN=1&page={page}&PageSize={page_size}".to_string(),
                base_url: "https://nhrc.cy.gov.tw/".to_string(),
                page_size: 20,
                selectors: SelectorSpec::new(
                    "div.area-essay.message",
                    "div.label li i.mark, li.mark",
                    "div.caption span",
                    "a[href]",
                ),
                content_selector: "div.area-essay".to_string(),
                table: TableSpec::new("human_rights_statements", "statement"),
            },
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control-yuan" | "control_yuan" | "cy" => Ok(Self::ControlYuan),
            "nhrc" | "human-rights" => Ok(Self::Nhrc),
            other => Err(format!(
                "unknown source '{other}' (expected control-yuan or nhrc)"
            )),
        }
    }
}

/// Destination table of a source's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    /// Column holding the extracted body text
    pub content_column: String,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, content_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_column: content_column.into(),
        }
    }
}

/// Everything the engine needs to know about one source site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProfile {
    pub kind: SourceKind,
    /// Listing URL with `{page}` and `{page_size}` placeholders
    pub listing_url_template: String,
    /// Base for resolving relative detail links
    pub base_url: String,
    pub page_size: u32,
    pub selectors: SelectorSpec,
    pub content_selector: String,
    pub table: TableSpec,
}

impl SourceProfile {
    /// Built-in profile with the overrides from `config` applied
    pub fn from_config(config: &SourceConfig) -> Result<Self, ParseError> {
        let mut profile = config.kind.profile();

        if let Some(template) = &config.listing_url {
            profile.listing_url_template = template.clone();
        }
        if let Some(base) = &config.base_url {
            profile.base_url = base.clone();
        }
        if let Some(page_size) = config.page_size {
            profile.page_size = page_size;
        }

        profile.parsed_base_url()?;
        Ok(profile)
    }

    /// Listing URL of a 1-based page number
    pub fn listing_url(&self, page: u32) -> String {
        self.listing_url_template
            .replace("{page}", &page.to_string())
            .replace("{page_size}", &self.page_size.to_string())
    }

    /// [`Self::base_url`] as a URL
    pub fn parsed_base_url(&self) -> Result<Url, ParseError> {
        Url::parse(&self.base_url)
            .map_err(|e| ParseError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_substitution() {
        let profile = SourceKind::ControlYuan.profile();
        assert_eq!(
            profile.listing_url(3),
            "https://www.cy.gov.tw/News.aspx?_CSN=129&n=792&page=3&PageSize=100&sms=8912&Create=1"
        );

        let nhrc = SourceKind::Nhrc.profile();
        assert_eq!(
            nhrc.listing_url(1),
            "https://nhrc.cy.gov.tw/News4.aspx?n=9772&sms=12362&_CSN=1&page=1&PageSize=20"
        );
    }

    #[test]
    fn test_builtin_selectors_compile() {
        for kind in [SourceKind::ControlYuan, SourceKind::Nhrc] {
            let profile = kind.profile();
            assert!(profile.selectors.compile().is_ok(), "{kind}");
            assert!(profile.parsed_base_url().is_ok(), "{kind}");
            assert!(crate::parser::selectors::compile(&profile.content_selector).is_ok());
        }
    }

    #[test]
    fn test_from_config_overrides() {
        let config = SourceConfig {
            kind: SourceKind::Nhrc,
            listing_url: Some("http://127.0.0.1:9000/list?page={page}".to_string()),
            base_url: Some("http://127.0.0.1:9000/".to_string()),
            page_size: Some(5),
        };

        let profile = SourceProfile::from_config(&config).unwrap();
        assert_eq!(profile.listing_url(2), "http://127.0.0.1:9000/list?page=2");
        assert_eq!(profile.base_url, "http://127.0.0.1:9000/");
        assert_eq!(profile.page_size, 5);
        assert_eq!(profile.table.name, "human_rights_statements");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = SourceConfig {
            base_url: Some("not a url".to_string()),
            ..SourceConfig::default()
        };
        assert!(matches!(
            SourceProfile::from_config(&config),
            Err(ParseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("control-yuan".parse(), Ok(SourceKind::ControlYuan));
        assert_eq!(" NHRC ".parse(), Ok(SourceKind::Nhrc));
        assert!("judicial-yuan".parse::<SourceKind>().is_err());
    }
}
