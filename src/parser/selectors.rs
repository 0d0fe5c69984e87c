//! CSS selectors for listing rows and detail content
//!
//! Sources describe their markup as plain selector strings so profiles can be
//! overridden from configuration; they are compiled once per parser.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::utils::error::ParseError;

/// Selector strings for one listing page layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSpec {
    /// One match per listing row
    pub row: String,
    /// Date label, relative to the row
    pub date: String,
    /// Title text, relative to the row
    pub title: String,
    /// Anchor carrying the detail `href`, relative to the row
    pub link: String,
}

impl SelectorSpec {
    pub fn new(
        row: impl Into<String>,
        date: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            row: row.into(),
            date: date.into(),
            title: title.into(),
            link: link.into(),
        }
    }

    /// Compile every selector, failing on the first invalid one
    pub fn compile(&self) -> Result<ListingSelectors, ParseError> {
        Ok(ListingSelectors {
            row: compile(&self.row)?,
            date: compile(&self.date)?,
            title: compile(&self.title)?,
            link: compile(&self.link)?,
        })
    }
}

/// Compiled form of [`SelectorSpec`]
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub row: Selector,
    pub date: Selector,
    pub title: Selector,
    pub link: Selector,
}

/// Compile one selector string
pub fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
