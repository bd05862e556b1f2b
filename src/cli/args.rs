use clap::{Parser, ValueEnum};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "estructura")]
#[command(
    version,
    about = "Print the directory tree of the current project",
    long_about = "Print the directory tree of the current working directory.\n\
                  Entries starting with '.' and node_modules directories are skipped."
)]
pub struct Cli {
    /// Diagnostic log level, written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Off)]
    pub log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}
