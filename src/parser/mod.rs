//! HTML parsing and data extraction
//!
//! Listing pages become [`EntryStub`](crate::models::EntryStub)s, detail pages
//! become plain text, and locale calendar labels become Gregorian dates.

pub mod content;
pub mod date;
pub mod listing;
pub mod sanitize;
pub mod selectors;

pub use content::{ContentExtractor, NO_CONTENT};
pub use date::{sentinel_date, DateNormalizer, NormalizedDate, ROC_YEAR_OFFSET};
pub use listing::{ListingParser, UNKNOWN_TITLE};
pub use selectors::{ListingSelectors, SelectorSpec};
