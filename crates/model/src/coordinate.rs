use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        geo::is_valid_position(self.latitude, self.longitude)
    }

    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        geo::haversine_distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// One sample reported by a position source.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters, if the source reports one.
    pub accuracy_meters: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_meters: None,
            timestamp,
        }
    }

    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters = Some(accuracy_meters);
        self
    }

    /// A fix stamped with the current time.
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(Coordinate::new(latitude, longitude), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_without_missing_accuracy() {
        let fix = Fix::now(54.32, 10.13);
        let json = serde_json::to_value(&fix).unwrap();
        assert_eq!(json["coordinate"]["latitude"], 54.32);
        assert!(json.get("accuracyMeters").is_none());

        let json = serde_json::to_value(fix.with_accuracy(3.5)).unwrap();
        assert_eq!(json["accuracyMeters"], 3.5);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(40.0, -73.0);
        let b = Coordinate::new(37.422, -122.0841);
        assert!((a.distance_meters(&b) - b.distance_meters(&a)).abs() < 1e-6);
        assert!(a.distance_meters(&b) > 4_000_000.0);
    }
}
