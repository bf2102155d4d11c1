//! The OpenFlights airport registry (`airports.dat`): comma separated,
//! mostly double-quoted fields, `\N` for unknown values.

use std::io::Read;

use _model::Airport;
use anyhow::{bail, Context, Result};
use csv::{ErrorKind, ReaderBuilder, StringRecord};

use crate::{
    report::{Reason, Rejection},
    utils::parse_degrees,
};

const ID: usize = 0;
const NAME: usize = 1;
const CITY: usize = 2;
const COUNTRY: usize = 3;
const IATA: usize = 4;
const LATITUDE: usize = 6;
const LONGITUDE: usize = 7;

const PLACEHOLDER: &str = "\\N";

pub struct Registry {
    /// In registry order, which decides ties between equally near airports.
    pub airports: Vec<Airport>,
    pub rows: u64,
    pub rejections: Vec<Rejection>,
}

pub fn parse(input: impl Read) -> Result<Registry> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut airports = Vec::new();
    let mut rows = 0;
    let mut rejections = Vec::new();

    for result in reader.records() {
        let (line, parsed) = match result {
            Ok(record) => {
                if is_blank(&record) {
                    continue;
                }
                let line = record.position().map_or(rows + 1, |x| x.line());
                (line, parse_record(&record))
            }
            Err(err) => {
                let unreadable = match err.kind() {
                    ErrorKind::Utf8 { pos, err } => Some((
                        pos.as_ref().map_or(rows + 1, |x| x.line()),
                        err.to_string(),
                    )),
                    _ => None,
                };
                match unreadable {
                    Some((line, message)) => (line, Err(Reason::Unreadable(message))),
                    None => return Err(err).context("failed to read airport registry"),
                }
            }
        };
        rows += 1;

        match parsed {
            Ok(airport) => airports.push(airport),
            Err(reason) => {
                let rejection = Rejection { row: line, reason };
                rejection.log("airport");
                rejections.push(rejection);
            }
        }
    }

    if rows == 0 {
        bail!("airport registry is empty");
    }

    Ok(Registry {
        airports,
        rows,
        rejections,
    })
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|x| x.trim().is_empty())
}

/// Strips one stray quote from either end, left behind by rows the csv
/// reader treats as unquoted.
fn field(record: &StringRecord, index: usize) -> &str {
    let x = record.get(index).unwrap_or_default();
    let x = x.strip_prefix('"').unwrap_or(x);
    x.strip_suffix('"').unwrap_or(x)
}

fn parse_record(record: &StringRecord) -> Result<Airport, Reason> {
    let iata = field(record, IATA);
    if iata.is_empty() {
        return Err(Reason::MissingIata);
    }
    if iata == PLACEHOLDER {
        return Err(Reason::PlaceholderIata);
    }

    let latitude = parse_degrees(field(record, LATITUDE))
        .ok_or_else(|| Reason::InvalidLatitude(field(record, LATITUDE).to_string()))?;
    let longitude = parse_degrees(field(record, LONGITUDE))
        .ok_or_else(|| Reason::InvalidLongitude(field(record, LONGITUDE).to_string()))?;

    Ok(Airport {
        id: field(record, ID).to_string(),
        name: field(record, NAME).to_string(),
        city: field(record, CITY).to_string(),
        country: field(record, COUNTRY).to_string(),
        iata: iata.to_string(),
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDG: &str = r#"1382,"Charles de Gaulle International Airport","Paris","France","CDG","LFPG",49.012798,2.55,392,1,"E","Europe/Paris","airport","OurAirports""#;
    const ORY: &str = r#"1386,"Paris-Orly Airport","Paris","France","ORY","LFPO",48.7233333,2.3794444,291,1,"E","Europe/Paris","airport","OurAirports""#;
    const NO_IATA: &str = r#"1,"Goroka Airport","Goroka","Papua New Guinea",\N,"AYGA",-6.081689834590001,145.391998291,5282,10,"U","Pacific/Port_Moresby","airport","OurAirports""#;

    fn parse_str(input: &str) -> Registry {
        parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn parses_quoted_rows() {
        let registry = parse_str(&format!("{CDG}\n{ORY}\n"));
        assert_eq!(registry.rows, 2);
        assert!(registry.rejections.is_empty());
        assert_eq!(
            registry.airports[0],
            Airport {
                id: "1382".to_string(),
                name: "Charles de Gaulle International Airport".to_string(),
                city: "Paris".to_string(),
                country: "France".to_string(),
                iata: "CDG".to_string(),
                latitude: 49.012798,
                longitude: 2.55,
            }
        );
        assert_eq!(registry.airports[1].iata, "ORY");
    }

    #[test]
    fn commas_inside_quotes() {
        let registry = parse_str(
            r#"3797,"John F Kennedy International Airport","New York, NY","United States","JFK","KJFK",40.63980103,-73.77890015,13,-5,"A","America/New_York","airport","OurAirports""#,
        );
        assert_eq!(registry.airports[0].city, "New York, NY");
        assert_eq!(registry.airports[0].longitude, -73.77890015);
    }

    #[test]
    fn unquoted_rows() {
        let registry = parse_str("7,Nadzab Airport,Nadzab,Papua New Guinea,LAE,AYNZ,-6.569803,146.725977\n");
        assert_eq!(registry.airports[0].iata, "LAE");
        assert_eq!(registry.airports[0].name, "Nadzab Airport");
    }

    #[test]
    fn rejects_unusable_rows() {
        let input = [
            NO_IATA,
            r#"2,"Madang Airport","Madang","Papua New Guinea","","AYMD",-5.20707988739,145.789001465"#,
            r#"3,"Mount Hagen Airport","Mount Hagen","Papua New Guinea","HGU","AYMH","north",144.29600524902344"#,
            r#"4,"Nadzab Airport","Nadzab","Papua New Guinea","LAE","AYNZ",-6.569803"#,
            "   ",
            CDG,
        ]
        .join("\n");
        let registry = parse_str(&input);

        assert_eq!(registry.rows, 5);
        assert_eq!(registry.airports.len(), 1);
        assert_eq!(registry.airports[0].iata, "CDG");
        assert_eq!(
            registry.rejections,
            vec![
                Rejection {
                    row: 1,
                    reason: Reason::PlaceholderIata
                },
                Rejection {
                    row: 2,
                    reason: Reason::MissingIata
                },
                Rejection {
                    row: 3,
                    reason: Reason::InvalidLatitude("north".to_string())
                },
                Rejection {
                    row: 4,
                    reason: Reason::InvalidLongitude("".to_string())
                },
            ]
        );
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(parse("".as_bytes()).is_err());
    }

    #[test]
    fn all_rows_rejected_is_not_fatal() {
        let registry = parse_str(NO_IATA);
        assert!(registry.airports.is_empty());
        assert_eq!(registry.rejections.len(), 1);
    }
}
