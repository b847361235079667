use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    pub bus_wait_time: f64, // minutes
    pub bus_velocity: f64,  // km/h
}

impl RoutingSettings {
    /// Bus speed in metres per minute, the unit edge weights are computed in.
    pub fn meters_per_minute(&self) -> f64 {
        self.bus_velocity * 1000.0 / 60.0
    }
}
