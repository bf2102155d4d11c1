mod airport;
mod city;

pub use airport::Airport;
pub use city::{sort_for_listing, City};
