//! Value normalization and the flattened tree result type.

use std::collections::BTreeMap;

/// Flattened tree read result: absolute file path → normalized content.
///
/// Keys are full paths, not basenames, so identically-named files in
/// different subdirectories do not collide. Iteration order carries no
/// meaning.
pub type TreeValues = BTreeMap<String, String>;

/// Normalize a value read from (or about to be compared against) a target
/// file: strip leading and trailing whitespace, preserving interior blank
/// lines.
///
/// A file containing `"2\n\n"` normalizes to `"2"`; `"3\n\n4\n\n"`
/// normalizes to `"3\n\n4"`.
pub fn normalize_value(raw: &str) -> String {
    raw.trim().to_string()
}
