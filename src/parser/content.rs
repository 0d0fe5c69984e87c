//! Detail page content extraction

use scraper::{ElementRef, Html, Node, Selector};

use super::sanitize::clean_fragment;
use super::selectors::compile;
use crate::utils::error::ParseError;

/// Stored when a detail page has no content container
pub const NO_CONTENT: &str = "No content found";

/// Elements whose text is never part of the content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts the text of the single content container of a detail page
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    container: Selector,
}

impl ContentExtractor {
    pub fn new(container: &str) -> Result<Self, ParseError> {
        Ok(Self {
            container: compile(container)?,
        })
    }

    /// Container text, or `None` when the container is absent
    ///
    /// Each text node becomes one line: fragments are trimmed, blank ones are
    /// dropped, and the rest are joined with `\n`, so block boundaries and
    /// `<br>` become line breaks.
    pub fn try_extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let container = document.select(&self.container).next()?;
        Some(container_lines(container).join("\n"))
    }

    /// Container text, or [`NO_CONTENT`] when the container is absent
    pub fn extract(&self, html: &str) -> String {
        self.try_extract(html).unwrap_or_else(|| {
            tracing::debug!("Content container not found");
            NO_CONTENT.to_string()
        })
    }
}

fn container_lines(container: ElementRef<'_>) -> Vec<String> {
    container
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let skipped = node
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|el| SKIPPED_ELEMENTS.contains(&el.value().name()));
                if skipped {
                    None
                } else {
                    clean_fragment(text)
                }
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_boundaries_become_line_breaks() {
        let extractor = ContentExtractor::new("div.area-essay.page-caption-p").unwrap();
        let html = r#"<html><body>
            <div class="area-essay">側欄</div>
            <div class="area-essay page-caption-p">
                <p>一、案由：</p>
                <p>  某機關違失  </p>
                <div>二、調查意見<br>  (一) 第一點 </div>
            </div>
        </body></html>"#;

        assert_eq!(
            extractor.extract(html),
            "一、案由：\n某機關違失\n二、調查意見\n(一) 第一點"
        );
    }

    #[test]
    fn test_spacing_inside_a_text_node_is_preserved() {
        let extractor = ContentExtractor::new("div.area-essay").unwrap();
        let html = "<div class=\"area-essay\"><pre>  第一項   第二項\n    附表一  </pre></div>";

        assert_eq!(extractor.extract(html), "第一項   第二項\n    附表一");
    }

    #[test]
    fn test_missing_container_returns_placeholder() {
        let extractor = ContentExtractor::new("div.area-essay").unwrap();
        assert_eq!(extractor.extract("<html><body><p>x</p></body></html>"), NO_CONTENT);
        assert_eq!(extractor.try_extract("<p>x</p>"), None);
    }

    #[test]
    fn test_first_container_wins_and_scripts_are_ignored() {
        let extractor = ContentExtractor::new("div.area-essay").unwrap();
        let html = r#"<div class="area-essay"><script>var x = 1;</script><p>聲明全文</p></div>
            <div class="area-essay"><p>其他</p></div>"#;
        assert_eq!(extractor.extract(html), "聲明全文");
    }

    #[test]
    fn test_empty_container_yields_empty_text() {
        let extractor = ContentExtractor::new("div.area-essay").unwrap();
        assert_eq!(extractor.extract(r#"<div class="area-essay">  </div>"#), "");
    }
}
