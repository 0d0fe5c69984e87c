//! Internationalization (i18n) support
//!
//! User-facing log lines and store error messages are available in English
//! (`en`) and Traditional Chinese (`zh-TW`), the language of the source site.
//!
//! # Environment Variables
//!
//! - `PT_LANG`: preferred language (`en`, `zh-TW`). Defaults to English.

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

/// Set the current locale for translations
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(normalize_locale(locale));
}

/// Initialize i18n from `PT_LANG`
pub fn init_from_env() {
    let locale = std::env::var("PT_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Map free-form locale names onto the shipped locale files
///
/// - zh-TW, zh_TW, zh-Hant, zh, chinese -> zh-TW
/// - everything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.to_lowercase();

    if lower.starts_with("zh") || lower == "chinese" {
        "zh-TW"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// ```rust,ignore
/// use policy_tracker::i18n::t;
///
/// let line = t!("events.inserted", title = "調查報告", date = "2023-05-03");
/// ```
#[doc(inline)]
pub use rust_i18n::t;
