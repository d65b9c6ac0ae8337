//! Locale-dependent formatting: localized names, medium dates and
//! locale-aware string comparison.
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::Locale;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::LocalizedEntry;

/// Rendered in place of any value that is absent.
pub const NO_VALUE_FALLBACK: &str = "---";

/// Active data locale plus the ordered project languages used as fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContext {
    pub locale: String,
    pub fallback_order: Vec<String>,
}

impl LocaleContext {
    pub fn new(locale: impl Into<String>, fallback_order: Vec<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback_order,
        }
    }

    /// Resolve a localized field to one display string.
    ///
    /// Lookup order: exact locale, primary language of the locale, then each
    /// fallback language in order. A fallback hit carries a language hint,
    /// e.g. `Rabatt (DE)`. Empty values count as missing.
    pub fn localized_name(&self, entries: Option<&[LocalizedEntry]>) -> String {
        let Some(entries) = entries else {
            return NO_VALUE_FALLBACK.to_string();
        };
        let by_locale = to_localized_map(entries);
        let lookup = |locale: &str| by_locale.get(locale).copied().filter(|v| !v.is_empty());

        if let Some(value) = lookup(&self.locale)
            .or_else(|| lookup(primary_language(&self.locale)))
        {
            return value.to_string();
        }

        self.fallback_order
            .iter()
            .find_map(|fallback| {
                lookup(fallback).map(|value| format!("{} ({})", value, fallback.to_uppercase()))
            })
            .unwrap_or_else(|| NO_VALUE_FALLBACK.to_string())
    }

    /// Medium date in the data locale, e.g. `Jan 5, 2023` or `5. Jan. 2023`.
    ///
    /// Absent values render as [`NO_VALUE_FALLBACK`]; values that are not a
    /// timestamp or a plain date are shown unchanged.
    pub fn format_date(&self, value: Option<&str>) -> String {
        let Some(raw) = value.filter(|v| !v.is_empty()) else {
            return NO_VALUE_FALLBACK.to_string();
        };
        let Some(parsed) = parse_timestamp(raw) else {
            return raw.to_string();
        };
        let (locale, pattern) = date_style(primary_language(&self.locale));
        parsed.format_localized(pattern, locale).to_string()
    }

    /// Collator for ordering strings in the data locale.
    pub fn collator(&self) -> TextCollator {
        TextCollator::new(&self.locale)
    }
}

/// Turn `[{locale, value}]` into a lookup map; later duplicates win.
fn to_localized_map(entries: &[LocalizedEntry]) -> HashMap<&str, &str> {
    entries
        .iter()
        .map(|e| (e.locale.as_str(), e.value.as_str()))
        .collect()
}

fn primary_language(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&midnight)))
}

fn date_style(language: &str) -> (chrono::Locale, &'static str) {
    match language {
        "de" => (chrono::Locale::de_DE, "%-d. %b %Y"),
        "fr" => (chrono::Locale::fr_FR, "%-d %b %Y"),
        "es" => (chrono::Locale::es_ES, "%-d %b %Y"),
        "it" => (chrono::Locale::it_IT, "%-d %b %Y"),
        "nl" => (chrono::Locale::nl_NL, "%-d %b %Y"),
        "pt" => (chrono::Locale::pt_PT, "%-d %b %Y"),
        _ => (chrono::Locale::en_US, "%b %-d, %Y"),
    }
}

/// ICU collation for the data locale. Unknown or unparsable locales use the
/// root collation.
pub struct TextCollator {
    inner: Option<Collator>,
}

impl TextCollator {
    pub fn new(locale: &str) -> Self {
        let parsed = locale
            .replace('_', "-")
            .parse::<Locale>()
            .unwrap_or(Locale::UND);
        let inner = Collator::try_new(&(&parsed).into(), CollatorOptions::new())
            .or_else(|_| Collator::try_new(&(&Locale::UND).into(), CollatorOptions::new()))
            .ok();
        Self { inner }
    }

    /// Collation order, with a code point tie-break so that distinct strings
    /// never compare equal.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let collated = match &self.inner {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        };
        collated.then_with(|| a.cmp(b))
    }
}

impl std::fmt::Debug for TextCollator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCollator")
            .field("loaded", &self.inner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<LocalizedEntry> {
        pairs
            .iter()
            .map(|(locale, value)| LocalizedEntry {
                locale: (*locale).into(),
                value: (*value).into(),
            })
            .collect()
    }

    fn ctx(locale: &str, fallbacks: &[&str]) -> LocaleContext {
        LocaleContext::new(locale, fallbacks.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn localized_name_prefers_exact_then_primary_locale() {
        let names = entries(&[("en", "Summer sale"), ("de-AT", "Sommer")]);
        assert_eq!(ctx("de-AT", &[]).localized_name(Some(names.as_slice())), "Sommer");
        assert_eq!(ctx("en-GB", &[]).localized_name(Some(names.as_slice())), "Summer sale");
    }

    #[test]
    fn localized_name_uses_fallback_order_with_hint() {
        let names = entries(&[("fr", "Soldes"), ("de", "Ausverkauf")]);
        let context = ctx("en", &["en", "de", "fr"]);
        assert_eq!(context.localized_name(Some(names.as_slice())), "Ausverkauf (DE)");
    }

    #[test]
    fn localized_name_falls_back_to_sentinel() {
        let names = entries(&[("fr", "Soldes")]);
        assert_eq!(ctx("en", &["de"]).localized_name(Some(names.as_slice())), NO_VALUE_FALLBACK);
        assert_eq!(ctx("en", &["de"]).localized_name(Some(&[][..])), NO_VALUE_FALLBACK);
        assert_eq!(ctx("en", &["de"]).localized_name(None), NO_VALUE_FALLBACK);
    }

    #[test]
    fn localized_name_last_duplicate_wins_and_empty_is_missing() {
        let names = entries(&[("en", "first"), ("en", "second"), ("de", "")]);
        assert_eq!(ctx("en", &[]).localized_name(Some(names.as_slice())), "second");
        assert_eq!(ctx("de", &[]).localized_name(Some(names.as_slice())), NO_VALUE_FALLBACK);
    }

    #[test]
    fn format_date_uses_locale_pattern() {
        let ts = Some("2023-01-05T10:30:00.000Z");
        assert_eq!(ctx("en", &[]).format_date(ts), "Jan 5, 2023");
        assert_eq!(ctx("en-US", &[]).format_date(Some("2022-11-20")), "Nov 20, 2022");
        assert!(ctx("de", &[]).format_date(ts).starts_with("5. "));
    }

    #[test]
    fn format_date_handles_missing_and_garbage() {
        assert_eq!(ctx("en", &[]).format_date(None), NO_VALUE_FALLBACK);
        assert_eq!(ctx("en", &[]).format_date(Some("")), NO_VALUE_FALLBACK);
        assert_eq!(ctx("en", &[]).format_date(Some("soon")), "soon");
    }

    #[test]
    fn collator_ignores_case_at_primary_strength() {
        let collator = TextCollator::new("en");
        assert_eq!(collator.compare("apple", "Banana"), Ordering::Less);
        assert_eq!(collator.compare("a", "A"), Ordering::Less);
        assert_eq!(collator.compare("éclair", "ecluse"), Ordering::Less);
        assert_eq!(collator.compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn collator_orders_empty_and_punctuation_first() {
        let collator = TextCollator::new("en");
        assert_eq!(collator.compare("", "2022-01-01"), Ordering::Less);
        assert_eq!(collator.compare("---", "Alpha"), Ordering::Less);
        assert_eq!(collator.compare("9", "a"), Ordering::Less);
        assert_eq!(
            collator.compare("2023-01-01T00:00:00.000Z", "2023-06-01T00:00:00.000Z"),
            Ordering::Less
        );
    }

    #[test]
    fn collator_places_non_ascii_letters_with_their_base() {
        let collator = TextCollator::new("pl");
        assert_eq!(collator.compare("Łódź", "Mango"), Ordering::Less);
        assert_eq!(collator.compare("Łódź", "Kraków"), Ordering::Greater);

        let collator = TextCollator::new("de_DE");
        assert_eq!(collator.compare("Straße", "Strasz"), Ordering::Less);
        assert_eq!(collator.compare("Äpfel", "Birnen"), Ordering::Less);
    }

    #[test]
    fn collator_accepts_unknown_locale() {
        let collator = TextCollator::new("not a locale");
        assert_eq!(collator.compare("Łódź", "Mango"), Ordering::Less);
        assert_eq!(collator.compare("b", "a"), Ordering::Greater);
    }
}
