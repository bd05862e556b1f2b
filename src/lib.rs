//! Prints an indented tree of a project directory, leaving out hidden
//! entries and `node_modules`.

pub mod cli;
pub mod core;
pub mod utils;
