//! Report rendering for the command line
//!
//! A [`Report`] is what one run found: the imports of the base directory and
//! the function names of each package that was scanned. It is rendered as
//! plain (optionally colored) text or as JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Functions found per package, plus the imports that selected the packages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Import paths of the base directory, in file order, duplicates kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Package (import path or directory) to its function names.
    pub packages: BTreeMap<String, BTreeSet<String>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the functions of `package`, merging with an earlier entry.
    pub fn add_package(&mut self, package: impl Into<String>, funcs: BTreeSet<String>) {
        self.packages.entry(package.into()).or_default().extend(funcs);
    }

    pub fn function_count(&self) -> usize {
        self.packages.values().map(BTreeSet::len).sum()
    }
}

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// End the output with a newline.
    pub trailing_newline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            trailing_newline: true,
        }
    }
}

impl OutputConfig {
    /// `use_color` is already the resolved decision, so it is not second
    /// guessed from `TERM`.
    pub fn color_choice(&self) -> ColorChoice {
        if self.use_color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }
}

enum Line<'a> {
    Header(&'a str),
    Func(&'a str),
}

/// Text formatter: one function name per line. Package headers are printed
/// only when more than one package is listed.
pub struct ReportFormatter<W> {
    config: OutputConfig,
    out: W,
}

impl ReportFormatter<StandardStream> {
    pub fn stdout(config: OutputConfig) -> Self {
        let choice = config.color_choice();
        Self::new(config, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> ReportFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_report(&mut self, report: &Report) -> io::Result<()> {
        let headers = report.packages.len() > 1;
        let mut lines = Vec::new();
        for (package, funcs) in &report.packages {
            if headers {
                lines.push(Line::Header(package));
            }
            lines.extend(funcs.iter().map(|f| Line::Func(f)));
        }

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            match line {
                Line::Header(name) => {
                    self.out
                        .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
                    write!(self.out, "{}:", name)?;
                    self.out.reset()?;
                }
                Line::Func(name) => {
                    let indent = if headers { "  " } else { "" };
                    write!(self.out, "{}", indent)?;
                    self.out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                    write!(self.out, "{}", name)?;
                    self.out.reset()?;
                }
            }
        }
        if self.config.trailing_newline && !lines.is_empty() {
            writeln!(self.out)?;
        }
        self.out.flush()
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &Report, trailing_newline: bool) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    out.write_all(json.as_bytes())?;
    if trailing_newline {
        writeln!(out)?;
    }
    out.flush()
}

/// Print the report as pretty-printed JSON to stdout.
pub fn print_json(report: &Report, trailing_newline: bool) -> io::Result<()> {
    write_json(io::stdout().lock(), report, trailing_newline)
}
