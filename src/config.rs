use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{documents::Format, matching::MATCH_RADIUS_KM};

/// Fallback matches farther than this end up in the report.
pub const WARNING_RADIUS_KM: f64 = 500.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// GeoNames extract read by the city loader.
    pub gazetteer: PathBuf,
    /// Cities document written by the loader and read by the matcher.
    pub cities: PathBuf,
    /// OpenFlights airport registry.
    pub airports: PathBuf,
    /// Cities document with airports filled in.
    pub output: PathBuf,
    pub match_radius_km: f64,
    pub warning_radius_km: f64,
    pub format: Format,
    /// Write a markdown summary next to each output.
    pub report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gazetteer: PathBuf::from("cities15000.txt"),
            cities: PathBuf::from("cities.json"),
            airports: PathBuf::from("airports.dat"),
            output: PathBuf::from("updated_cities.json"),
            match_radius_km: MATCH_RADIUS_KM,
            warning_radius_km: WARNING_RADIUS_KM,
            format: Format::Json,
            report: true,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::parse(&yaml).with_context(|| format!("invalid config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, x) in [
            ("match-radius-km", self.match_radius_km),
            ("warning-radius-km", self.warning_radius_km),
        ] {
            if !x.is_finite() || x <= 0.0 {
                bail!("{key} must be a positive number of kilometres, got {x}");
            }
        }
        Ok(())
    }
}
