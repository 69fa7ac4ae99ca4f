//! CLI entry point for gofunc

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use gofunc::{
    collect_functions_with, collect_imports_with, package_dir, parse_dir, print_json, walk_packages,
    DumpCollector, FieldFilter, FileFilter, OutputConfig, ParseMode, Report, ReportFormatter,
    not_nil_filter,
};
use termcolor::StandardStream;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gofunc")]
#[command(about = "List the imports and function names of Go packages, and dump their syntax trees")]
#[command(version)]
struct Args {
    /// Directory whose imports are listed (or dumped with --dump)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Import path of a single package to list instead of DIR's imports
    pkg: Option<String>,

    /// Directory that import paths are resolved under [default: $GOROOT/src]
    #[arg(long = "pkg-root", value_name = "PATH", env = "GOFUNC_PKG_ROOT")]
    pkg_root: Option<PathBuf>,

    /// Print each function declaration and expression statement of DIR as
    /// source, followed by its syntax tree
    #[arg(long = "dump", conflicts_with_all = ["pkg", "json"])]
    dump: bool,

    /// Also list unexported functions
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Print every field in --dump output, including nil ones
    #[arg(long = "all-fields", requires = "dump")]
    all_fields: bool,

    /// Skip Go files whose name matches pattern (can be used multiple times)
    #[arg(short = 'I', long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Don't print the final newline
    #[arg(short = 'n', long = "no-newline")]
    no_newline: bool,

    /// Log parsing progress to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

/// The package root from the command line, `GOFUNC_PKG_ROOT` or `$GOROOT/src`.
fn resolve_pkg_root(args: &Args) -> Result<PathBuf, String> {
    if let Some(root) = &args.pkg_root {
        return Ok(root.clone());
    }
    match std::env::var_os("GOROOT") {
        Some(goroot) if !goroot.is_empty() => Ok(PathBuf::from(goroot).join("src")),
        _ => Err("no package root: pass --pkg-root or set GOFUNC_PKG_ROOT or GOROOT".to_string()),
    }
}

fn functions_of(dir: &Path, filter: &FileFilter, all: bool) -> Result<BTreeSet<String>, String> {
    let funcs = collect_functions_with(dir, |p| filter.is_included(p), !all).map_err(|e| e.to_string())?;
    if funcs.is_empty() {
        warn!(dir = %dir.display(), "no functions found");
    }
    Ok(funcs)
}

fn build_report(args: &Args, filter: &FileFilter) -> Result<Report, String> {
    let root = resolve_pkg_root(args)?;
    let mut report = Report::new();

    if let Some(pkg) = &args.pkg {
        let dir = package_dir(&root, pkg);
        debug!(package = %pkg, dir = %dir.display(), "listing package");
        report.add_package(pkg.as_str(), functions_of(&dir, filter, args.all)?);
        return Ok(report);
    }

    report.imports = collect_imports_with(&args.dir, |p| filter.is_included(p)).map_err(|e| e.to_string())?;
    if report.imports.is_empty() {
        warn!(dir = %args.dir.display(), "no imports found");
    }

    let imports = report.imports.clone();
    let mut seen = BTreeSet::new();
    for pkg in &imports {
        if !seen.insert(pkg.as_str()) {
            continue;
        }
        let dir = package_dir(&root, pkg);
        debug!(package = %pkg, dir = %dir.display(), "listing package");
        let funcs = functions_of(&dir, filter, args.all)?;
        report.add_package(pkg.as_str(), funcs);
    }
    Ok(report)
}

fn run_dump(args: &Args, filter: &FileFilter, use_color: bool) -> Result<(), String> {
    let packages = parse_dir(&args.dir, |p| filter.is_included(p), ParseMode::Full).map_err(|e| e.to_string())?;
    if packages.is_empty() {
        warn!(dir = %args.dir.display(), "no Go packages found");
    }

    let not_nil: &FieldFilter = &not_nil_filter;
    let field_filter = (!args.all_fields).then_some(not_nil);
    let config = OutputConfig {
        use_color,
        ..Default::default()
    };
    let mut dump = DumpCollector::new(StandardStream::stdout(config.color_choice()), field_filter);
    walk_packages(&mut dump, &packages);
    dump.finish()
        .map(drop)
        .map_err(|e| format!("error writing output: {}", e))
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let filter = FileFilter::with_excludes(&args.exclude).unwrap_or_else(|e| {
        eprintln!("gofunc: invalid --exclude pattern: {}", e);
        process::exit(1);
    });
    let use_color = should_use_color(args.color);

    let result = if args.dump {
        run_dump(&args, &filter, use_color)
    } else {
        build_report(&args, &filter).and_then(|report| {
            let written = if args.json {
                print_json(&report, !args.no_newline)
            } else {
                let config = OutputConfig {
                    use_color,
                    trailing_newline: !args.no_newline,
                };
                ReportFormatter::stdout(config).write_report(&report)
            };
            written.map_err(|e| format!("error writing output: {}", e))
        })
    };

    if let Err(e) = result {
        eprintln!("gofunc: {}", e);
        process::exit(1);
    }
}
