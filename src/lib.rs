pub mod config;
pub mod documents;
pub mod geonames;
pub mod matching;
pub mod openflights;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use _model::{Airport, City};
