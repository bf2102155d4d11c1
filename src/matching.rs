use std::collections::BTreeSet;

use _model::{Airport, City};
use geo::Point;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default radius within which every airport counts as serving a city.
pub const MATCH_RADIUS_KM: f64 = 50.0;

/// Great-circle distance in kilometres between two lon/lat points.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push antipodal points just past 1
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Airports named after the city or within the match radius.
    Direct(BTreeSet<String>),
    /// Nothing matched directly, so the closest airport anywhere.
    Nearest { iata: String, distance: f64 },
    /// The registry has no airports.
    Unmatched,
}

impl Outcome {
    pub fn airports(&self) -> BTreeSet<String> {
        match self {
            Self::Direct(x) => x.clone(),
            Self::Nearest { iata, .. } => BTreeSet::from([iata.clone()]),
            Self::Unmatched => BTreeSet::new(),
        }
    }
}

pub struct Matcher<'a> {
    airports: &'a [Airport],
    /// Lower-cased `Airport::city`, by index.
    names: Vec<String>,
    radius: f64,
}

impl<'a> Matcher<'a> {
    pub fn new(airports: &'a [Airport], radius: f64) -> Self {
        Self {
            airports,
            names: airports.iter().map(|x| x.city.to_lowercase()).collect(),
            radius,
        }
    }

    /// Scans every airport once. Ties for nearest go to the airport listed
    /// first.
    pub fn find(&self, city: &City) -> Outcome {
        let name = city.name.to_lowercase();
        let point = city.point();

        let mut direct = BTreeSet::new();
        let mut nearest: Option<(f64, &Airport)> = None;
        for (airport, airport_city) in self.airports.iter().zip(&self.names) {
            let distance = haversine_distance(point, airport.point());
            if *airport_city == name || distance <= self.radius {
                direct.insert(airport.iata.clone());
            }
            if distance < nearest.map_or(f64::INFINITY, |(d, _)| d) {
                nearest = Some((distance, airport));
            }
        }

        if !direct.is_empty() {
            Outcome::Direct(direct)
        } else if let Some((distance, airport)) = nearest {
            Outcome::Nearest {
                iata: airport.iata.clone(),
                distance,
            }
        } else {
            Outcome::Unmatched
        }
    }

    pub fn assign(&self, city: &mut City) -> Outcome {
        let outcome = self.find(city);
        city.airports = outcome.airports();
        outcome
    }
}
