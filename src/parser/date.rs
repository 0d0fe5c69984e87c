//! Locale calendar date normalization
//!
//! The source site labels entries with Republic-of-China calendar dates
//! (`112-5-3`), whose year 1 is Gregorian 1912. Normalization never fails:
//! an unreadable token yields the sentinel date `1970-01-01` and a warning,
//! so one bad label cannot abort a crawl run.

use chrono::NaiveDate;

use crate::utils::error::DateParseError;

/// Years between the ROC epoch and the Gregorian calendar
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// Date stored for entries whose label cannot be read (1970-01-01)
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::default()
}

/// Outcome of [`DateNormalizer::normalize_checked`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    /// Set when `date` is the sentinel
    pub fallback: Option<DateParseError>,
}

/// Converts `Y-M-D` tokens on an offset calendar into Gregorian dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    year_offset: i32,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::roc()
    }
}

impl DateNormalizer {
    /// Normalizer for the Republic-of-China calendar
    #[must_use]
    pub fn roc() -> Self {
        Self::with_offset(ROC_YEAR_OFFSET)
    }

    #[must_use]
    pub fn with_offset(year_offset: i32) -> Self {
        Self { year_offset }
    }

    /// Parse a token, reporting why it could not be read
    pub fn try_normalize(&self, token: &str) -> Result<NaiveDate, DateParseError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DateParseError::Empty);
        }

        let parts: Vec<&str> = token.split('-').collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(DateParseError::WrongArity {
                token: token.to_string(),
                found: parts.len(),
            });
        };

        let year: i32 = parse_component(token, year)?;
        let month: u32 = parse_component(token, month)?;
        let day: u32 = parse_component(token, day)?;
        let year = year
            .checked_add(self.year_offset)
            .ok_or(DateParseError::OutOfRange { year, month, day })?;

        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateParseError::OutOfRange { year, month, day })
    }

    /// Parse a token, substituting [`sentinel_date`] on failure
    pub fn normalize(&self, token: &str) -> NaiveDate {
        self.normalize_checked(token).date
    }

    /// Like [`Self::normalize`], but keeps the reason a fallback happened
    pub fn normalize_checked(&self, token: &str) -> NormalizedDate {
        match self.try_normalize(token) {
            Ok(date) => NormalizedDate {
                date,
                fallback: None,
            },
            Err(e) => {
                tracing::warn!(token, error = %e, "Unreadable date token, using sentinel");
                NormalizedDate {
                    date: sentinel_date(),
                    fallback: Some(e),
                }
            }
        }
    }
}

fn parse_component<T: std::str::FromStr>(token: &str, part: &str) -> Result<T, DateParseError> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::NotNumeric {
            token: token.to_string(),
            part: part.to_string(),
        });
    }
    part.parse().map_err(|_| DateParseError::NotNumeric {
        token: token.to_string(),
        part: part.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_offset_and_zero_padding() {
        let normalizer = DateNormalizer::roc();
        assert_eq!(normalizer.normalize("112-5-3").to_string(), "2023-05-03");
        assert_eq!(normalizer.normalize("113-12-31").to_string(), "2024-12-31");
        assert_eq!(normalizer.normalize("101-01-09").to_string(), "2012-01-09");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let normalizer = DateNormalizer::roc();
        assert_eq!(normalizer.normalize("  112-5-3\n").to_string(), "2023-05-03");
    }

    #[test]
    fn test_malformed_tokens_return_sentinel() {
        let normalizer = DateNormalizer::roc();
        for token in ["abc", "", "112-5", "112-5-3-1", "112-x-3", "-5-3", "112/5/3"] {
            assert_eq!(
                normalizer.normalize(token).to_string(),
                "1970-01-01",
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_impossible_calendar_date_returns_sentinel() {
        let normalizer = DateNormalizer::roc();
        assert_eq!(
            normalizer.try_normalize("112-2-30"),
            Err(DateParseError::OutOfRange {
                year: 2023,
                month: 2,
                day: 30
            })
        );
        assert_eq!(normalizer.normalize("112-13-1"), sentinel_date());
    }

    #[test]
    fn test_error_reasons() {
        let normalizer = DateNormalizer::roc();
        assert_eq!(normalizer.try_normalize("   "), Err(DateParseError::Empty));
        assert!(matches!(
            normalizer.try_normalize("112-5"),
            Err(DateParseError::WrongArity { found: 2, .. })
        ));
        assert!(matches!(
            normalizer.try_normalize("112-五-3"),
            Err(DateParseError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_normalize_checked_reports_fallback() {
        let normalizer = DateNormalizer::roc();

        let ok = normalizer.normalize_checked("112-5-3");
        assert_eq!(ok.date.to_string(), "2023-05-03");
        assert_eq!(ok.fallback, None);

        let bad = normalizer.normalize_checked("民國112年");
        assert_eq!(bad.date, sentinel_date());
        assert!(matches!(
            bad.fallback,
            Some(DateParseError::WrongArity { found: 1, .. })
        ));
    }

    #[test]
    fn test_custom_offset() {
        let gregorian = DateNormalizer::with_offset(0);
        assert_eq!(gregorian.normalize("2023-5-3").to_string(), "2023-05-03");
    }

    #[test]
    fn test_sentinel_is_unix_epoch() {
        assert_eq!(sentinel_date().to_string(), "1970-01-01");
    }
}
