//! Character identity normalization

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `<base>_<digits>`; the greedy base makes the last suffix win
    static ref SUFFIXED_KEY: Regex = Regex::new(r"(?s)^(.+)_([0-9]+)$").unwrap();
}

/// Strips the extractor's disambiguating `_<n>` suffix from a character key.
///
/// `"张_1"` becomes `"张"` and `"__2"` (the third underscore) becomes `"_"`.
/// Keys without a purely numeric suffix, or whose base would be empty, are
/// returned unchanged.
pub fn normalize_char(raw: &str) -> &str {
    SUFFIXED_KEY
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |base| base.as_str())
}
