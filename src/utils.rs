use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{bail, Context, Result};
use indicatif::ProgressStyle;

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {human_pos}/{human_len} {percent}% ({per_sec})")
        .expect("hardcoded")
}

fn is_zstd(path: &Path) -> bool {
    path.extension().is_some_and(|x| x == "zst")
}

/// Opens a required input, decompressing `.zst` files on the fly.
pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.exists() {
        bail!("input file {} not found", path.display());
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if is_zstd(path) {
        let decoder = zstd::Decoder::new(file)
            .with_context(|| format!("failed to decompress {}", path.display()))?;
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Writes an output, compressing it when the path ends in `.zst`.
pub fn write(path: &Path, contents: &[u8]) -> Result<()> {
    let result = if is_zstd(path) {
        let compressed = zstd::encode_all(contents, 0)?;
        fs::write(path, compressed)
    } else {
        fs::write(path, contents)
    };
    result.with_context(|| format!("failed to write {}", path.display()))
}

/// Parses a coordinate in decimal degrees. Surrounding whitespace is allowed,
/// infinities and NaN are not.
pub fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}
