//! Stage runners: read inputs, run a stage, write its document and report.

use std::path::Path;

use _model::{Airport, City};
use anyhow::{Context, Result};
use indicatif::ProgressIterator;
use tracing::{info, warn};

use crate::{
    config::Config,
    documents,
    geonames::{self, Gazetteer},
    matching::{Matcher, Outcome},
    openflights::{self, Registry},
    report::{Reason, Rejection, Report},
    utils::{self, progress_style},
};

fn load_gazetteer(config: &Config) -> Result<Gazetteer> {
    let path = &config.gazetteer;
    info!("Loading gazetteer {}", path.display());
    let gazetteer = geonames::parse(utils::open(path)?)
        .with_context(|| format!("failed to load gazetteer {}", path.display()))?;
    info!(
        "Kept {} cities from {} rows ({} skipped)",
        gazetteer.cities.len(),
        gazetteer.rows,
        gazetteer.rejections.len()
    );
    Ok(gazetteer)
}

fn load_registry(config: &Config) -> Result<Registry> {
    let path = &config.airports;
    info!("Loading airports {}", path.display());
    let registry = openflights::parse(utils::open(path)?)
        .with_context(|| format!("failed to load airports {}", path.display()))?;
    info!(
        "Kept {} airports from {} rows ({} skipped)",
        registry.airports.len(),
        registry.rows,
        registry.rejections.len()
    );
    if registry.airports.is_empty() {
        warn!("No usable airports, cities will be written without any");
    }
    Ok(registry)
}

fn write_gazetteer(config: &Config, gazetteer: &Gazetteer) -> Result<()> {
    write_cities(&config.cities, &gazetteer.cities, config)?;

    if config.report {
        let mut report = Report::default();
        report.stat("gazetteer rows", gazetteer.rows)?;
        report.stat("other places", gazetteer.other_places)?;
        report.rejections("gazetteer", &gazetteer.rejections)?;
        report.stat("cities", gazetteer.cities.len())?;
        report.write(&config.cities)?;
    }
    Ok(())
}

/// Gazetteer to cities document.
pub fn cities(config: &Config) -> Result<Vec<City>> {
    let gazetteer = load_gazetteer(config)?;
    write_gazetteer(config, &gazetteer)?;
    Ok(gazetteer.cities)
}

/// Reads a cities document back for matching. Records that no longer pass
/// the loader's checks are returned as rejections numbered by record, and
/// any existing airports are cleared.
pub fn load_cities(path: &Path) -> Result<(Vec<City>, Vec<Rejection>)> {
    let mut cities = documents::decode(utils::open(path)?)
        .with_context(|| format!("failed to load cities {}", path.display()))?;

    let mut rejections = Vec::new();
    let mut record = 0;
    cities.retain_mut(|city| {
        record += 1;
        let reason = if city.name.is_empty() {
            Some(Reason::MissingName)
        } else if city.country.is_empty() {
            Some(Reason::MissingCountry)
        } else if !geonames::LATITUDES.contains(&city.latitude) {
            Some(Reason::InvalidLatitude(city.latitude.to_string()))
        } else if !geonames::LONGITUDES.contains(&city.longitude) {
            Some(Reason::InvalidLongitude(city.longitude.to_string()))
        } else {
            None
        };

        match reason {
            Some(reason) => {
                let rejection = Rejection { row: record, reason };
                rejection.log("city");
                rejections.push(rejection);
                false
            }
            None => {
                city.airports.clear();
                true
            }
        }
    });

    if cities.is_empty() {
        warn!("{} has no cities", path.display());
    }
    Ok((cities, rejections))
}

#[derive(Debug, Default)]
pub struct Summary {
    pub direct: usize,
    pub nearest: usize,
    pub unmatched: usize,
    /// Fallbacks beyond the warning radius.
    pub far: Vec<String>,
}

pub fn assign_airports(cities: &mut [City], airports: &[Airport], config: &Config) -> Summary {
    let matcher = Matcher::new(airports, config.match_radius_km);
    let mut summary = Summary::default();

    for city in cities.iter_mut().progress_with_style(progress_style()) {
        match matcher.assign(city) {
            Outcome::Direct(_) => summary.direct += 1,
            Outcome::Nearest { iata, distance } => {
                summary.nearest += 1;
                if distance > config.warning_radius_km {
                    summary.far.push(format!(
                        "{} ({}, {}): nearest airport {iata} is {distance:.0} km away",
                        city.name, city.code, city.country
                    ));
                }
            }
            Outcome::Unmatched => summary.unmatched += 1,
        }
    }

    summary
}

fn match_and_write(
    config: &Config,
    registry: &Registry,
    mut cities: Vec<City>,
    rejected_cities: &[Rejection],
) -> Result<Vec<City>> {
    info!(
        "Matching {} cities within {} km...",
        cities.len(),
        config.match_radius_km
    );
    let summary = assign_airports(&mut cities, &registry.airports, config);
    info!(
        "{} matched directly, {} fell back to the nearest airport",
        summary.direct, summary.nearest
    );

    write_cities(&config.output, &cities, config)?;

    if config.report {
        let mut report = Report::default();
        report.rejections("city", rejected_cities)?;
        report.stat("airport rows", registry.rows)?;
        report.rejections("airport", &registry.rejections)?;
        report.stat("airports", registry.airports.len())?;
        report.stat("cities", cities.len())?;
        report.stat("matched by name or distance", summary.direct)?;
        report.stat("matched to the nearest airport", summary.nearest)?;
        report.stat("without airports", summary.unmatched)?;
        for x in &summary.far {
            report.todo(x)?;
        }
        report.write(&config.output)?;
    }

    Ok(cities)
}

/// Airport registry plus cities to the updated cities document.
/// `rejected_cities` are the records [`load_cities`] dropped, for the report.
pub fn airports(
    config: &Config,
    cities: Vec<City>,
    rejected_cities: &[Rejection],
) -> Result<Vec<City>> {
    let registry = load_registry(config)?;
    match_and_write(config, &registry, cities, rejected_cities)
}

/// Both stages, passing cities along in memory. Both inputs are read before
/// anything is written.
pub fn run(config: &Config) -> Result<Vec<City>> {
    let gazetteer = load_gazetteer(config)?;
    let registry = load_registry(config)?;

    write_gazetteer(config, &gazetteer)?;
    match_and_write(config, &registry, gazetteer.cities, &[])
}

fn write_cities(path: &Path, cities: &[City], config: &Config) -> Result<()> {
    utils::write(path, &documents::encode(cities, config.format)?)?;
    info!("Wrote {} cities to {}", cities.len(), path.display());
    Ok(())
}
