use std::fmt::Display;

const EARTH_RADIUS: f64 = 6371000.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl LatLng {
    /// Great-circle distance in metres between two `[lat, lng]` points, in the
    /// shape expected by the k-d tree.
    pub fn distance(loc1: &[f64], loc2: &[f64]) -> f64 {
        assert!(loc1.len() == 2);
        assert!(loc2.len() == 2);
        haversine(loc1[0], loc1[1], loc2[0], loc2[1])
    }

    pub fn dist(&self, other: Self) -> f64 {
        haversine(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn as_point(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let delta_latitude = (lat1 - lat2).to_radians();
    let delta_longitude = (lng1 - lng2).to_radians();

    let central_angle_inner = (delta_latitude / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_longitude / 2.0).sin().powi(2);
    let central_angle = 2.0 * central_angle_inner.sqrt().asin();

    EARTH_RADIUS * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = LatLng {
            latitude: 50.8466,
            longitude: 4.3528,
        };
        let b = LatLng {
            latitude: 50.8503,
            longitude: 4.3517,
        };

        assert_eq!(a.dist(a), 0.0);
        assert!((a.dist(b) - b.dist(a)).abs() < 1e-9);
        assert!((a.dist(b) - LatLng::distance(&a.as_point(), &b.as_point())).abs() < 1e-9);
        // Roughly 420 m between those two points.
        assert!(a.dist(b) > 350.0 && a.dist(b) < 500.0);
    }
}
