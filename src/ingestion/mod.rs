pub mod catalogue;
pub mod gtfs;
