use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::utils::{is_excluded, sort_entries};

pub const HEADER: &str = "Estructura del proyecto:";
const INDENT: &str = "    ";
const CONNECTOR: &str = "|-- ";

/// Prints the header and the tree rooted at `root` to standard output.
///
/// Output is flushed before returning, also when the traversal fails, so
/// every line produced before the failing directory stays visible.
pub fn run_tree(root: &Path) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let result = print_tree(&mut out, root);
    let flushed = out.flush();
    result?;
    flushed.context("failed to flush standard output")?;
    Ok(())
}

/// Writes the header followed by the tree rooted at `root`.
pub fn print_tree<W: Write + ?Sized>(out: &mut W, root: &Path) -> Result<()> {
    write_header(out)?;
    show_structure(out, root, 0)
}

pub fn write_header<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{HEADER}")?;
    writeln!(out)
}

/// Depth-first listing of `path`, one line per visible entry.
///
/// Siblings are visited in byte order. Hidden entries and `node_modules`
/// are skipped together with their subtrees. Directories, including
/// symlinks that resolve to one, are descended into with `depth + 1`.
pub fn show_structure<W: Write + ?Sized>(out: &mut W, path: &Path, depth: usize) -> Result<()> {
    for name in list_entries(path)? {
        let full_path = path.join(&name);
        if is_excluded(&name) {
            trace!(path = %full_path.display(), "skipping excluded entry");
            continue;
        }

        writeln!(out, "{}", format_line(&name, depth))?;

        if full_path.is_dir() {
            trace!(path = %full_path.display(), depth = depth + 1, "descending");
            show_structure(out, &full_path, depth + 1)?;
        }
    }
    Ok(())
}

pub fn format_line(name: &OsStr, depth: usize) -> String {
    format!("{}{}{}", INDENT.repeat(depth), CONNECTOR, name.to_string_lossy())
}

// ---------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------
fn list_entries(path: &Path) -> Result<Vec<OsString>> {
    debug!(path = %path.display(), "reading directory");
    let rd = fs::read_dir(path)
        .with_context(|| format!("failed to read directory {}", path.display()))?;

    let mut names = rd
        .map(|entry| entry.map(|de| de.file_name()))
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read directory {}", path.display()))?;

    sort_entries(&mut names);
    Ok(names)
}
