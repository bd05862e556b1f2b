pub mod filter;

pub use filter::{is_excluded, is_hidden, sort_entries, EXCLUDED_DIR};
