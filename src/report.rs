use std::{
    fmt::{self, Write},
    fs::write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::{debug, warn};

/// Why an input row was left out.
#[derive(Clone, Debug, PartialEq)]
pub enum Reason {
    TooFewFields(usize),
    MissingName,
    MissingCountry,
    InvalidLatitude(String),
    InvalidLongitude(String),
    MissingIata,
    PlaceholderIata,
    Unreadable(String),
}

impl Reason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooFewFields(_) => "too few fields",
            Self::MissingName => "missing name",
            Self::MissingCountry => "missing country",
            Self::InvalidLatitude(_) => "invalid latitude",
            Self::InvalidLongitude(_) => "invalid longitude",
            Self::MissingIata => "missing IATA code",
            Self::PlaceholderIata => "placeholder IATA code",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields(x) => write!(f, "insufficient fields ({x})"),
            Self::InvalidLatitude(x) => write!(f, "invalid latitude {x:?}"),
            Self::InvalidLongitude(x) => write!(f, "invalid longitude {x:?}"),
            Self::Unreadable(x) => write!(f, "unreadable row: {x}"),
            x => f.write_str(x.kind()),
        }
    }
}

/// A skipped row.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    /// Position in its input, from 1: the line for text files, the record
    /// for cities documents.
    pub row: u64,
    pub reason: Reason,
}

impl Rejection {
    pub fn log(&self, source: &str) {
        // the airport registry has thousands of these
        if self.reason == Reason::PlaceholderIata {
            debug!(row = self.row, "skipping {source} row: {}", self.reason);
        } else {
            warn!(row = self.row, "skipping {source} row: {}", self.reason);
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Markdown summary written next to a stage's output.
#[derive(Default)]
pub struct Report {
    stats: String,
    todo: String,
}

impl Report {
    pub fn stat(&mut self, label: &str, value: impl fmt::Display) -> Result<()> {
        writeln!(self.stats, "- {value} {label}")?;
        Ok(())
    }

    pub fn todo(&mut self, item: impl fmt::Display) -> Result<()> {
        writeln!(self.todo, "- {item}")?;
        Ok(())
    }

    pub fn rejections(&mut self, source: &str, rejections: &[Rejection]) -> Result<()> {
        let counts = rejections.iter().map(|x| x.reason.kind()).counts();
        for (kind, count) in counts.into_iter().sorted() {
            self.stat(&format!("{source} rows skipped: {kind}"), count)?;
        }

        let listed: Vec<_> = rejections
            .iter()
            .filter(|x| x.reason != Reason::PlaceholderIata)
            .collect();
        if !listed.is_empty() {
            writeln!(self.todo, "- skipped {source} rows:")?;
            for x in listed {
                writeln!(self.todo, "  - {x}")?;
            }
        }
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let mut md = String::new();
        writeln!(md, "## Statistics\n")?;
        write!(md, "{}", self.stats)?;
        writeln!(md)?;
        if !self.todo.is_empty() {
            writeln!(md, "## Todo\n")?;
            write!(md, "{}", self.todo)?;
        }
        Ok(md)
    }

    pub fn write(&self, output: &Path) -> Result<PathBuf> {
        let path = path_for(output);
        write(&path, self.render()?)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Ok(path)
    }
}

/// `cities.json` -> `cities.md`, `cities.json.zst` -> `cities.md`
pub fn path_for(output: &Path) -> PathBuf {
    let output = match output.extension() {
        Some(x) if x == "zst" => output.with_extension(""),
        _ => output.to_path_buf(),
    };
    output.with_extension("md")
}
