//! GeoNames gazetteer extracts (`cities15000.txt` and friends): tab separated,
//! one place per line, no header and no quoting.

use std::{collections::BTreeSet, io::BufRead, ops::RangeInclusive};

use _model::{sort_for_listing, City};
use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::{
    report::{Reason, Rejection},
    utils::parse_degrees,
};

pub const MIN_FIELDS: usize = 19;

const ID: usize = 0;
const NAME: usize = 1;
const LATITUDE: usize = 4;
const LONGITUDE: usize = 5;
const FEATURE_CLASS: usize = 6;
const COUNTRY_CODE: usize = 8;

/// Feature class of cities, towns and villages.
const POPULATED_PLACE: &str = "P";

pub const LATITUDES: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDES: RangeInclusive<f64> = -180.0..=180.0;

pub struct Gazetteer {
    /// Sorted with [`sort_for_listing`].
    pub cities: Vec<City>,
    /// Non-blank lines read.
    pub rows: u64,
    /// Well-formed rows of another feature class.
    pub other_places: u64,
    pub rejections: Vec<Rejection>,
}

pub fn parse(input: impl BufRead) -> Result<Gazetteer> {
    let mut cities = Vec::new();
    let mut rows = 0;
    let mut other_places = 0;
    let mut rejections = Vec::new();

    for (index, line) in input.split(b'\n').enumerate() {
        let mut line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        let parsed = match String::from_utf8(line) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => parse_row(&line),
            Err(err) => Err(Reason::Unreadable(err.utf8_error().to_string())),
        };
        rows += 1;

        match parsed {
            Ok(Some(city)) => cities.push(city),
            Ok(None) => other_places += 1,
            Err(reason) => {
                let rejection = Rejection {
                    row: index as u64 + 1,
                    reason,
                };
                rejection.log("gazetteer");
                rejections.push(rejection);
            }
        }
    }

    if rows == 0 {
        bail!("gazetteer is empty");
    }
    if cities.is_empty() {
        warn!("no cities were kept, check that feature class {POPULATED_PLACE} rows exist and the columns are aligned");
    }

    sort_for_listing(&mut cities);

    Ok(Gazetteer {
        cities,
        rows,
        other_places,
        rejections,
    })
}

/// `Ok(None)` for places that aren't populated.
fn parse_row(line: &str) -> Result<Option<City>, Reason> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_FIELDS {
        return Err(Reason::TooFewFields(fields.len()));
    }

    if fields[FEATURE_CLASS] != POPULATED_PLACE {
        return Ok(None);
    }

    let name = fields[NAME];
    if name.is_empty() {
        return Err(Reason::MissingName);
    }
    let country = fields[COUNTRY_CODE];
    if country.is_empty() {
        return Err(Reason::MissingCountry);
    }

    let latitude = parse_degrees(fields[LATITUDE])
        .filter(|x| LATITUDES.contains(x))
        .ok_or_else(|| Reason::InvalidLatitude(fields[LATITUDE].to_string()))?;
    let longitude = parse_degrees(fields[LONGITUDE])
        .filter(|x| LONGITUDES.contains(x))
        .ok_or_else(|| Reason::InvalidLongitude(fields[LONGITUDE].to_string()))?;

    Ok(Some(City {
        name: name.to_string(),
        code: fields[ID].to_string(),
        country: country.to_string(),
        airports: BTreeSet::new(),
        latitude,
        longitude,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str, lat: &str, lon: &str, class: &str, country: &str) -> String {
        let mut fields = vec![""; MIN_FIELDS];
        fields[ID] = id;
        fields[NAME] = name;
        fields[2] = name;
        fields[LATITUDE] = lat;
        fields[LONGITUDE] = lon;
        fields[FEATURE_CLASS] = class;
        fields[7] = "PPLC";
        fields[COUNTRY_CODE] = country;
        fields[14] = "2138551";
        fields[17] = "Europe/Paris";
        fields[18] = "2024-05-01";
        fields.join("\t")
    }

    fn parse_str(input: &str) -> Gazetteer {
        parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn keeps_populated_places() {
        let input = [
            row("2988507", "Paris", "48.85341", "2.3488", "P", "FR"),
            row("2993458", "Mont Blanc", "45.83265", "6.86517", "T", "FR"),
        ]
        .join("\n");
        let gazetteer = parse_str(&input);

        assert_eq!(gazetteer.rows, 2);
        assert_eq!(gazetteer.other_places, 1);
        assert!(gazetteer.rejections.is_empty());
        assert_eq!(
            gazetteer.cities,
            vec![City {
                name: "Paris".to_string(),
                code: "2988507".to_string(),
                country: "FR".to_string(),
                airports: BTreeSet::new(),
                latitude: 48.85341,
                longitude: 2.3488,
            }]
        );
    }

    #[test]
    fn skips_short_rows() {
        let input = format!(
            "2988507\tParis\tParis\n\n{}\r\n",
            row("2643743", "London", "51.50853", "-0.12574", "P", "GB")
        );
        let gazetteer = parse_str(&input);

        assert_eq!(gazetteer.rows, 2);
        assert_eq!(gazetteer.cities.len(), 1);
        assert_eq!(gazetteer.cities[0].name, "London");
        assert_eq!(
            gazetteer.rejections,
            vec![Rejection {
                row: 1,
                reason: Reason::TooFewFields(3)
            }]
        );
    }

    #[test]
    fn rejects_invalid_fields() {
        let input = [
            row("1", "", "1", "1", "P", "FR"),
            row("2", "Nowhere", "1", "1", "P", ""),
            row("3", "Nowhere", "abc", "1", "P", "FR"),
            row("4", "Nowhere", "91", "1", "P", "FR"),
            row("5", "Nowhere", "1", "-180.5", "P", "FR"),
            row("6", "Nowhere", "NaN", "1", "P", "FR"),
            row("7", "Edge", "-90", "180", "P", "AQ"),
        ]
        .join("\n");
        let gazetteer = parse_str(&input);

        let reasons: Vec<_> = gazetteer
            .rejections
            .iter()
            .map(|x| (x.row, x.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, Reason::MissingName),
                (2, Reason::MissingCountry),
                (3, Reason::InvalidLatitude("abc".to_string())),
                (4, Reason::InvalidLatitude("91".to_string())),
                (5, Reason::InvalidLongitude("-180.5".to_string())),
                (6, Reason::InvalidLatitude("NaN".to_string())),
            ]
        );
        assert_eq!(gazetteer.cities.len(), 1);
        assert_eq!(gazetteer.cities[0].code, "7");
    }

    #[test]
    fn sorts_by_name() {
        let input = [
            row("3", "Zurich", "47.36667", "8.55", "P", "CH"),
            row("2", "Évora", "38.56667", "-7.9", "P", "PT"),
            row("1", "Amsterdam", "52.37403", "4.88969", "P", "NL"),
            row("4", "Eindhoven", "51.44083", "5.47778", "P", "NL"),
            row("5", "Ōsaka", "34.69374", "135.50218", "P", "JP"),
        ]
        .join("\n");
        let names: Vec<_> = parse_str(&input)
            .cities
            .into_iter()
            .map(|x| x.name)
            .collect();

        assert_eq!(names, vec!["Amsterdam", "Eindhoven", "Évora", "Ōsaka", "Zurich"]);
    }

    #[test]
    fn skips_rows_with_invalid_utf8() {
        let mut input = row("1", "Bad", "1", "1", "P", "FR").into_bytes();
        input[2] = 0xff;
        input.push(b'\n');
        input.extend(row("2", "Good", "2", "2", "P", "FR").into_bytes());

        let gazetteer = parse(&input[..]).unwrap();
        assert_eq!(gazetteer.rows, 2);
        assert_eq!(gazetteer.cities.len(), 1);
        assert_eq!(gazetteer.cities[0].name, "Good");
        assert_eq!(gazetteer.rejections.len(), 1);
        assert_eq!(gazetteer.rejections[0].row, 1);
        assert!(matches!(
            gazetteer.rejections[0].reason,
            Reason::Unreadable(_)
        ));
    }

    #[test]
    fn no_cities_is_not_fatal() {
        let input = row("2993458", "Mont Blanc", "45.83265", "6.86517", "T", "FR");
        let gazetteer = parse_str(&input);
        assert!(gazetteer.cities.is_empty());
        assert_eq!(gazetteer.other_places, 1);
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(parse("".as_bytes()).is_err());
        assert!(parse(" \n\n\t\n".as_bytes()).is_err());
    }
}
