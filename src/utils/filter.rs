use std::ffi::{OsStr, OsString};

/// Directory name that is never printed nor descended into.
pub const EXCLUDED_DIR: &str = "node_modules";

pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// True when an entry (and its whole subtree) must be left out of the tree.
pub fn is_excluded(name: &OsStr) -> bool {
    name == EXCLUDED_DIR || is_hidden(name)
}

/// Sorts entry names ascending by their raw bytes, so the order is
/// case-sensitive and independent of the current locale.
pub fn sort_entries(names: &mut [OsString]) {
    names.sort();
}
