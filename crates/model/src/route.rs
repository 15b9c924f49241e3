use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{format, geo};

use crate::coordinate::Coordinate;

/// A driving route as returned by a router. Always constructed as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Polyline from origin to destination.
    pub points: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteResult {
    pub fn new(points: Vec<Coordinate>, distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            points,
            distance_meters: distance_meters.max(0.0),
            duration_seconds: duration_seconds.max(0.0),
        }
    }

    pub fn formatted_distance(&self) -> String {
        format::format_distance(self.distance_meters)
    }

    pub fn formatted_duration(&self) -> String {
        format::format_duration(self.duration_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        geo::bounding_box(
            points
                .into_iter()
                .map(|point| (point.latitude, point.longitude)),
        )
        .map(|(min, max)| Self {
            south_west: min.into(),
            north_east: max.into(),
        })
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&point.latitude)
            && (self.south_west.longitude..=self.north_east.longitude)
                .contains(&point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_summary() {
        let route = RouteResult::new(vec![], 5_000_000.0, 18_000.0);
        assert_eq!(route.formatted_distance(), "5000.0 km");
        assert_eq!(route.formatted_duration(), "5h 0min");
    }

    #[test]
    fn negative_values_are_clamped() {
        let route = RouteResult::new(vec![], -1.0, -2.0);
        assert_eq!(route.distance_meters, 0.0);
        assert_eq!(route.duration_seconds, 0.0);
    }

    #[test]
    fn bounds_of_two_points() {
        let origin = Coordinate::new(40.0, -73.0);
        let destination = Coordinate::new(37.422, -122.0841);
        let bounds = Bounds::from_points([&origin, &destination]).unwrap();
        assert_eq!(bounds.south_west, Coordinate::new(37.422, -122.0841));
        assert_eq!(bounds.north_east, Coordinate::new(40.0, -73.0));
        assert!(bounds.contains(&origin));
        assert!(bounds.contains(&destination));
        assert!(!bounds.contains(&Coordinate::new(41.0, -73.0)));
    }
}
