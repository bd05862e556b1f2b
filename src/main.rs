use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use estructura::cli::Cli;
use estructura::core::tree;

#[cfg(windows)]
fn enable_utf8_output() {
    use windows_sys::Win32::System::Console::SetConsoleOutputCP;
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

fn main() -> Result<()> {
    #[cfg(windows)]
    enable_utf8_output();
    let cli = Cli::parse();
    setup_tracing(&cli);
    debug!("parsed CLI arguments: {cli:?}");

    tree::run_tree(Path::new("."))
}

// Logs go to stderr only; stdout carries nothing but the tree.
fn setup_tracing(cli: &Cli) {
    if let Some(level) = cli.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
