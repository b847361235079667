pub mod ingestion;
pub mod routing;
pub mod services;
pub mod structures;
pub mod web;
