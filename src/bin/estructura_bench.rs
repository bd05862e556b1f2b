use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::prelude::*;
use rand::SeedableRng;
use serde::Serialize;
use walkdir::WalkDir;

use estructura::core::tree::show_structure;
use estructura::utils::{is_excluded, EXCLUDED_DIR};

#[cfg(unix)]
type RusageSnapshot = libc::rusage;

#[cfg(not(unix))]
type RusageSnapshot = ();

#[derive(Parser, Debug)]
#[command(
    name = "estructura-bench",
    about = "Synthetic tree generator and benchmark runner for estructura"
)]
struct BenchCli {
    #[command(subcommand)]
    cmd: BenchCmd,
}

#[derive(Subcommand, Debug)]
enum BenchCmd {
    /// Generate a synthetic project tree for benchmarks
    Gen(GenArgs),
    /// Run benchmark cases and write a JSON report
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct GenArgs {
    /// Number of files to create
    #[arg(long, default_value_t = 100_000)]
    files: usize,

    /// Maximum directory depth below the root
    #[arg(long, default_value_t = 8)]
    depth: usize,

    /// Number of symlinks to regular files
    #[arg(long, default_value_t = 1_000)]
    symlinks: usize,

    /// Destination root for generated data
    #[arg(long)]
    root: Option<PathBuf>,

    /// Optional RNG seed for deterministic generation
    #[arg(long)]
    seed: Option<u64>,

    /// Remove any existing output directory first
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Comma separated case names, or "all"
    #[arg(long, default_value = "all")]
    cases: String,

    /// Output path for the JSON report
    #[arg(long)]
    out: Option<PathBuf>,

    /// Root directory containing the generated tree
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Serialize)]
struct BenchReport {
    status: String,
    root: String,
    timestamp: String,
    cases: Vec<CaseResult>,
}

#[derive(Serialize)]
struct CaseResult {
    name: String,
    status: String,
    wall_time_ms: u128,
    /// Visible entries, i.e. lines the tree printer would emit.
    entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    dirs: Option<usize>,
    errors: usize,
    note: Option<String>,
    resources: ResourceUsage,
}

#[derive(Serialize, Default)]
struct ResourceUsage {
    /// Delta of maximum resident set size in kilobytes, where supported.
    max_rss_kb: Option<i64>,
    minor_faults: Option<i64>,
    major_faults: Option<i64>,
    voluntary_ctxt: Option<i64>,
    involuntary_ctxt: Option<i64>,
}

fn main() -> Result<()> {
    let cli = BenchCli::parse();
    match cli.cmd {
        BenchCmd::Gen(args) => run_gen(&args),
        BenchCmd::Run(args) => run_run(&args),
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./bench-data/gen")
}

// ---------------------------------------------------------------------
// gen
// ---------------------------------------------------------------------
fn run_gen(args: &GenArgs) -> Result<()> {
    if args.depth == 0 {
        bail!("depth must be at least 1");
    }

    let root = args.root.clone().unwrap_or_else(default_root);
    if root.exists() {
        if args.force {
            fs::remove_dir_all(&root)
                .with_context(|| format!("removing existing root {}", root.display()))?;
        } else {
            bail!(
                "output root {} exists; re-run with --force to replace",
                root.display()
            );
        }
    }
    fs::create_dir_all(&root).with_context(|| format!("creating root {}", root.display()))?;
    // Symlink targets must not depend on the link's own directory.
    let root = fs::canonicalize(&root)
        .with_context(|| format!("resolving root {}", root.display()))?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut created_dirs: HashSet<PathBuf> = HashSet::new();
    created_dirs.insert(root.clone());
    let mut files: Vec<PathBuf> = Vec::with_capacity(args.files);

    for i in 0..args.files {
        let depth = rng.gen_range(0..args.depth);
        let dir = ensure_dir_for_depth(&root, depth, &mut rng, &mut created_dirs)?;
        let path = dir.join(random_file_name(&mut rng, i));
        File::create(&path).with_context(|| format!("creating file {}", path.display()))?;
        files.push(path);
    }

    if args.symlinks > 0 {
        create_symlinks(&root, args.symlinks, &files, &mut rng, &mut created_dirs)?;
    }

    println!(
        "generated {} files in {} directories under {}",
        files.len(),
        created_dirs.len(),
        root.display()
    );
    Ok(())
}

fn ensure_dir_for_depth(
    root: &Path,
    depth: usize,
    rng: &mut StdRng,
    created: &mut HashSet<PathBuf>,
) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    for level in 0..depth {
        let segment = match rng.gen_range(0..20) {
            0 => format!(".d{}-{}", level, rng.gen_range(0..100)),
            1 => EXCLUDED_DIR.to_string(),
            _ => format!("d{}-{}", level, rng.gen_range(0..100)),
        };
        path.push(segment);
    }

    if created.insert(path.clone()) {
        fs::create_dir_all(&path)
            .with_context(|| format!("creating directory {}", path.display()))?;
    }
    Ok(path)
}

fn random_file_name(rng: &mut StdRng, index: usize) -> String {
    if rng.gen_bool(0.15) {
        format!(".file-{}", index)
    } else {
        format!("file-{}", index)
    }
}

fn create_symlinks(
    root: &Path,
    count: usize,
    targets: &[PathBuf],
    rng: &mut StdRng,
    created_dirs: &mut HashSet<PathBuf>,
) -> Result<()> {
    if targets.is_empty() {
        return Ok(());
    }

    for i in 0..count {
        let target = &targets[rng.gen_range(0..targets.len())];
        let link_dir = ensure_dir_for_depth(root, rng.gen_range(0..=3), rng, created_dirs)?;
        let link_path = link_dir.join(format!("symlink-{}", i));
        create_symlink(target, &link_path).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link_path.display(),
                target.display()
            )
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

// ---------------------------------------------------------------------
// run
// ---------------------------------------------------------------------
fn run_run(args: &RunArgs) -> Result<()> {
    let out = args.out.clone().unwrap_or_else(|| PathBuf::from("bench.json"));
    let root = args.root.clone().unwrap_or_else(default_root);
    if !root.exists() {
        bail!("benchmark root {} does not exist", root.display());
    }

    let mut results = Vec::new();
    for name in parse_cases(&args.cases)? {
        match name.as_str() {
            "traversal" => results.push(run_traversal_case(&root)),
            "walk" => results.push(run_walk_case(&root)),
            other => bail!("unsupported benchmark case: {}", other),
        }
    }

    let report = BenchReport {
        status: report_status(&results).to_string(),
        root: root.display().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        cases: results,
    };

    let json = serde_json::to_string_pretty(&report)?;
    let mut file =
        File::create(&out).with_context(|| format!("creating report {}", out.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// "ok" only when every case succeeded and all cases saw the same number
/// of visible entries.
fn report_status(results: &[CaseResult]) -> &'static str {
    if results.iter().any(|c| c.status != "ok") {
        return "partial";
    }
    let counts: HashSet<usize> = results.iter().map(|c| c.entries).collect();
    if counts.len() > 1 {
        eprintln!("[warn] cases disagree on visible entry count: {counts:?}");
        return "partial";
    }
    "ok"
}

fn parse_cases(cases: &str) -> Result<Vec<String>> {
    if cases.trim() == "all" {
        return Ok(vec!["traversal".to_string(), "walk".to_string()]);
    }

    let parsed: Vec<String> = cases
        .split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect();

    if parsed.is_empty() {
        bail!("no benchmark cases provided");
    }
    Ok(parsed)
}

/// Counts lines written by the tree printer.
#[derive(Default)]
struct LineCounter {
    lines: usize,
}

impl Write for LineCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lines += buf.iter().filter(|&&b| b == b'\n').count();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_traversal_case(root: &Path) -> CaseResult {
    let usage_before = take_rusage();
    let start = Instant::now();
    let mut counter = LineCounter::default();
    let outcome = show_structure(&mut counter, root, 0);
    let wall_time = start.elapsed().as_millis();
    let resources = resource_usage_delta(usage_before, take_rusage());

    let (status, errors, note) = match outcome {
        Ok(()) => ("ok", 0, None),
        Err(err) => ("failed", 1, Some(format!("{err:#}"))),
    };

    CaseResult {
        name: "traversal".to_string(),
        status: status.to_string(),
        wall_time_ms: wall_time,
        entries: counter.lines,
        dirs: None,
        errors,
        note,
        resources,
    }
}

fn run_walk_case(root: &Path) -> CaseResult {
    let usage_before = take_rusage();
    let start = Instant::now();
    let mut entries = 0usize;
    let mut dirs = 0usize;
    let mut errors = 0usize;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name()));
    for entry in walker {
        match entry {
            Ok(e) => {
                entries += 1;
                if e.file_type().is_dir() {
                    dirs += 1;
                }
            }
            Err(err) => {
                errors += 1;
                eprintln!("walk error: {err}");
            }
        }
    }

    let wall_time = start.elapsed().as_millis();
    let resources = resource_usage_delta(usage_before, take_rusage());
    let status = if errors == 0 { "ok" } else { "partial" };
    let note = (errors > 0).then(|| format!("encountered {} traversal errors", errors));

    CaseResult {
        name: "walk".to_string(),
        status: status.to_string(),
        wall_time_ms: wall_time,
        entries,
        dirs: Some(dirs),
        errors,
        note,
        resources,
    }
}

#[cfg(unix)]
fn take_rusage() -> Option<RusageSnapshot> {
    use std::mem::MaybeUninit;

    let mut usage = MaybeUninit::<libc::rusage>::uninit();
    let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if ret == 0 {
        Some(unsafe { usage.assume_init() })
    } else {
        None
    }
}

#[cfg(not(unix))]
fn take_rusage() -> Option<RusageSnapshot> {
    None
}

#[cfg(unix)]
fn resource_usage_delta(
    start: Option<RusageSnapshot>,
    end: Option<RusageSnapshot>,
) -> ResourceUsage {
    fn delta<F>(start: &RusageSnapshot, end: &RusageSnapshot, f: F) -> i64
    where
        F: Fn(&RusageSnapshot) -> i64,
    {
        f(end).saturating_sub(f(start))
    }

    match (start, end) {
        (Some(s), Some(e)) => ResourceUsage {
            max_rss_kb: Some(delta(&s, &e, |u| u.ru_maxrss as i64)),
            minor_faults: Some(delta(&s, &e, |u| u.ru_minflt as i64)),
            major_faults: Some(delta(&s, &e, |u| u.ru_majflt as i64)),
            voluntary_ctxt: Some(delta(&s, &e, |u| u.ru_nvcsw as i64)),
            involuntary_ctxt: Some(delta(&s, &e, |u| u.ru_nivcsw as i64)),
        },
        _ => ResourceUsage::default(),
    }
}

#[cfg(not(unix))]
fn resource_usage_delta(_: Option<RusageSnapshot>, _: Option<RusageSnapshot>) -> ResourceUsage {
    ResourceUsage::default()
}
