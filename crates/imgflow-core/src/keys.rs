//! Key and prefix rules.
//!
//! Object stores are flat; a prefix such as `original/` only emulates a
//! folder. The worker relies on two rules: a result key is the source key
//! with its leading source prefix swapped for the destination prefix, and the
//! two prefixes never overlap, so no result key can fall under the source
//! prefix.

/// Whether `key` lies under `prefix`.
#[must_use]
pub fn is_under_prefix(key: &str, prefix: &str) -> bool {
    key.starts_with(prefix)
}

/// Whether either prefix is a prefix of the other.
///
/// # Examples
///
/// ```
/// use imgflow_core::keys::prefixes_overlap;
///
/// assert!(!prefixes_overlap("original/", "resized/"));
/// assert!(prefixes_overlap("original/", "original/small/"));
/// ```
#[must_use]
pub fn prefixes_overlap(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Derive the result key for `key`, or `None` when `key` is not under
/// `source_prefix`.
///
/// Only the leading occurrence of the source prefix is replaced; the same
/// string elsewhere in the key is kept.
///
/// # Examples
///
/// ```
/// use imgflow_core::keys::destination_key;
///
/// assert_eq!(
///     destination_key("original/a/original/b.png", "original/", "resized/").as_deref(),
///     Some("resized/a/original/b.png"),
/// );
/// assert_eq!(destination_key("other/b.png", "original/", "resized/"), None);
/// ```
#[must_use]
pub fn destination_key(key: &str, source_prefix: &str, destination_prefix: &str) -> Option<String> {
    key.strip_prefix(source_prefix)
        .map(|rest| format!("{destination_prefix}{rest}"))
}
