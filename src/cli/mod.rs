pub mod args;

pub use args::{Cli, LogLevel};
