//! Schematic name normalization and disambiguation.

use lazy_static::lazy_static;
use rustc_hash::FxHashSet;

use crate::error::StoreError;
use crate::limits::{MAX_NAME_LEN, MAX_NAME_SUFFIX};
use crate::store::backend::FILE_EXTENSION;

/// Longest name that still fits a file name once `.blueprint` is appended.
pub const MAX_STEM_LEN: usize = MAX_NAME_LEN - FILE_EXTENSION.len() - 1;

lazy_static! {
    /// Device names Windows refuses as file names, with or without an extension.
    static ref RESERVED_NAMES: FxHashSet<&'static str> = {
        let mut names: FxHashSet<&'static str> =
            ["con", "prn", "aux", "nul", "com"].into_iter().collect();
        names.extend([
            "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
            "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
        ]);
        names
    };
}

/// Normalizes a proposed name into a file-system and identifier safe form.
///
/// Lowercases, replaces every character outside `[a-z0-9._-]` with `_`,
/// and wraps reserved device names as `_name_`. Returns `None` when nothing
/// is left.
pub fn normalize_name(name: &str) -> Option<String> {
    let mut out: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    if out.is_empty() {
        return None;
    }
    if is_reserved(&out) {
        out = format!("_{out}_");
    }
    // Only ASCII remains, so byte truncation is safe
    out.truncate(MAX_STEM_LEN);
    Some(out)
}

fn is_reserved(name: &str) -> bool {
    if name.ends_with('.') {
        return true;
    }
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
    RESERVED_NAMES.contains(stem)
}

/// Splits a trailing `_<digits>` counter off a name.
fn split_counter(name: &str) -> Option<(&str, u32)> {
    let (base, digits) = name.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|count| (base, count))
}

/// Picks the first unused name for `normalized`.
///
/// The name itself is used when free. Otherwise a counter is appended as
/// `_<n>`, starting from the name's own trailing counter (or 1) and counting
/// up until `is_taken` says no. The search stops at the suffix limit.
pub fn next_unused_name<F>(normalized: &str, mut is_taken: F) -> Result<String, StoreError>
where
    F: FnMut(&str) -> bool,
{
    if !is_taken(normalized) {
        return Ok(normalized.to_string());
    }

    let (base, start) = split_counter(normalized).unwrap_or((normalized, 1));

    for count in start..=MAX_NAME_SUFFIX {
        let suffix = format!("_{count}");
        let mut base = base.to_string();
        // Keep the suffix inside the length limit
        base.truncate(MAX_STEM_LEN.saturating_sub(suffix.len()));
        let candidate = base + &suffix;
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(StoreError::NameCollisionExhausted {
        base: base.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken<'a>(names: &'a [&'a str]) -> impl FnMut(&str) -> bool + 'a {
        move |candidate| names.iter().any(|n| *n == candidate)
    }

    #[test]
    fn test_normalize_replaces_illegal_chars() {
        assert_eq!(normalize_name("Foo!").as_deref(), Some("foo_"));
        assert_eq!(normalize_name("My House v2.0").as_deref(), Some("my_house_v2.0"));
        assert_eq!(normalize_name("tür").as_deref(), Some("t_r"));
        assert_eq!(normalize_name(""), None);
    }

    #[test]
    fn test_normalize_wraps_reserved_names() {
        assert_eq!(normalize_name("CON").as_deref(), Some("_con_"));
        assert_eq!(normalize_name("lpt3.txt").as_deref(), Some("_lpt3.txt_"));
        // `$` is replaced before the check, so CLOCK$ can never survive
        assert_eq!(normalize_name("clock$").as_deref(), Some("clock_"));
        assert_eq!(normalize_name("house.").as_deref(), Some("_house._"));
        assert_eq!(normalize_name("console").as_deref(), Some("console"));
        assert_eq!(normalize_name("lpt0").as_deref(), Some("lpt0"));
    }

    #[test]
    fn test_normalize_truncates() {
        let long = "a".repeat(400);
        let name = normalize_name(&long).unwrap();
        assert_eq!(name.len(), MAX_STEM_LEN);
        assert!(name.len() + FILE_EXTENSION.len() + 1 <= MAX_NAME_LEN);
    }

    #[test]
    fn test_free_name_is_used_as_is() {
        assert_eq!(next_unused_name("foo", taken(&[])).unwrap(), "foo");
    }

    #[test]
    fn test_counter_skips_existing() {
        let existing = ["foo", "foo_1", "foo_2"];
        assert_eq!(next_unused_name("foo", taken(&existing)).unwrap(), "foo_3");
    }

    #[test]
    fn test_counter_continues_from_suffix() {
        let existing = ["house_7"];
        assert_eq!(next_unused_name("house_7", taken(&existing)).unwrap(), "house_8");
    }

    #[test]
    fn test_suffix_respects_length_limit() {
        let base = "b".repeat(MAX_STEM_LEN);
        let existing = [base.as_str()];
        let name = next_unused_name(&base, taken(&existing)).unwrap();
        assert_eq!(name.len(), MAX_STEM_LEN);
        assert!(name.ends_with("_1"));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let result = next_unused_name("foo", |_| true);
        assert!(matches!(
            result,
            Err(StoreError::NameCollisionExhausted { base }) if base == "foo"
        ));
    }
}
