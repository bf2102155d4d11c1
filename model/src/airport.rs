use geo::Point;
use serde::{Deserialize, Serialize};

/// An entry of the airport registry that carries an IATA code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub name: String,
    /// Name of the city the airport serves, as written in the registry.
    pub city: String,
    pub country: String,
    pub iata: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}
