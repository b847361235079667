use std::fmt::Display;

use crate::structures::LatLng;

#[derive(Debug, Clone, PartialEq)]
pub struct StopData {
    pub name: String,
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusData {
    pub name: String,
    pub stops: Vec<StopID>,
    pub is_roundtrip: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopID(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusID(pub usize);

impl BusData {
    /// Stop sequences the vehicle rides without a transfer. A round trip runs its
    /// list once; any other line runs it forward and then back.
    pub fn traversals(&self) -> Vec<Vec<StopID>> {
        if self.is_roundtrip {
            return vec![self.stops.clone()];
        }
        let mut backward = self.stops.clone();
        backward.reverse();
        vec![self.stops.clone(), backward]
    }
}

impl Display for StopID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for BusID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
