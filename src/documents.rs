use std::io::BufRead;

use _model::City;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Layout of a cities document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// Pretty-printed array, ready for `mongoimport --jsonArray`
    #[default]
    Json,
    /// One compact object per line
    Jsonl,
}

pub fn encode(cities: &[City], format: Format) -> Result<Vec<u8>> {
    let mut output = String::new();
    match format {
        Format::Json => {
            output = serde_json::to_string_pretty(cities)?;
            output.push('\n');
        }
        Format::Jsonl => {
            for x in cities {
                output.push_str(&serde_json::to_string(x)?);
                output.push('\n');
            }
        }
    }
    Ok(output.into_bytes())
}

/// Reads either layout, telling them apart by the first character.
pub fn decode(mut input: impl BufRead) -> Result<Vec<City>> {
    let mut contents = String::new();
    input.read_to_string(&mut contents)?;

    if contents.trim().is_empty() {
        bail!("cities document is empty");
    }

    if contents.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&contents)?);
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid city on line {}", index + 1))
        })
        .collect()
}
