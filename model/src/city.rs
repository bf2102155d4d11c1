use std::collections::BTreeSet;

use feruca::Collator;
use geo::Point;
use serde::{Deserialize, Serialize};

/// A populated place from the gazetteer, with the IATA codes of the airports
/// that serve it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "cityName")]
    pub name: String,
    /// GeoNames id
    #[serde(rename = "cityCode")]
    pub code: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
    #[serde(default)]
    pub airports: BTreeSet<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

/// Listing order: Unicode collation of the name (CLDR root), then the exact
/// name, then the code to keep it total.
pub fn sort_for_listing(cities: &mut [City]) {
    let mut collator = Collator::default();
    cities.sort_by(|a, b| {
        collator
            .collate(a.name.as_str(), b.name.as_str())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.code.cmp(&b.code))
    });
}
