//! Listing page parsing
//!
//! Turns one listing page into [`EntryStub`]s in document order. The crawl
//! driver relies on that order (newest first) for its stop policy, so rows
//! are never sorted or deduplicated here.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::sanitize::clean_label;
use super::selectors::{ListingSelectors, SelectorSpec};
use crate::models::EntryStub;
use crate::utils::error::ParseError;

/// Title stored when a row carries no title label
pub const UNKNOWN_TITLE: &str = "未知標題";

/// Parser for the listing pages of one source
#[derive(Debug, Clone)]
pub struct ListingParser {
    selectors: ListingSelectors,
    base_url: Url,
}

impl ListingParser {
    /// Compile `spec` and resolve relative links against `base_url`
    pub fn new(spec: &SelectorSpec, base_url: Url) -> Result<Self, ParseError> {
        Ok(Self {
            selectors: spec.compile()?,
            base_url,
        })
    }

    /// Parse a listing page into entry stubs
    ///
    /// A row without a date label gets an empty token (the normalizer turns it
    /// into the sentinel date); a row without a title gets [`UNKNOWN_TITLE`].
    /// Rows without a usable link are skipped with a warning.
    pub fn parse(&self, html: &str) -> Vec<EntryStub> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.row)
            .enumerate()
            .filter_map(|(index, row)| match self.parse_row(row) {
                Ok(stub) => Some(stub),
                Err(e) => {
                    tracing::warn!(row = index, error = %e, "Skipping listing row");
                    None
                }
            })
            .collect()
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Result<EntryStub, ParseError> {
        let href = row
            .select(&self.selectors.link)
            .find_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ParseError::LinkNotFound)?;

        let detail_url = self
            .base_url
            .join(href)
            .map_err(|e| ParseError::InvalidUrl(format!("{href}: {e}")))?;

        let date_token = first_text(row, &self.selectors.date).unwrap_or_default();
        let title = first_text(row, &self.selectors.title).unwrap_or_else(|| {
            tracing::debug!(url = %detail_url, "Listing row has no title label");
            UNKNOWN_TITLE.to_string()
        });

        Ok(EntryStub {
            date_token,
            title,
            detail_url,
        })
    }
}

/// Text of the first non-empty match of `selector` inside `row`
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .map(|el| clean_label(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}
