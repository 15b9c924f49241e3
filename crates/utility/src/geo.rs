pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Returns `true` if the pair lies within WGS84 latitude/longitude range.
pub fn is_valid_position(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Smallest `((min_lat, min_lon), (max_lat, max_lon))` box containing every
/// given point. `None` for an empty input.
pub fn bounding_box<I>(points: I) -> Option<((f64, f64), (f64, f64))>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    points.into_iter().fold(None, |acc, (lat, lon)| match acc {
        None => Some(((lat, lon), (lat, lon))),
        Some(((min_lat, min_lon), (max_lat, max_lon))) => Some((
            (min_lat.min(lat), min_lon.min(lon)),
            (max_lat.max(lat), max_lon.max(lon)),
        )),
    })
}

/// Great-circle distance in kilometers.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn haversine_distance_meters(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    haversine_distance(latitude_1, longitude_1, latitude_2, longitude_2) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_identical_points_is_zero() {
        assert_eq!(haversine_distance(54.3, 10.1, 54.3, 10.1), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111.19).abs() < 0.1, "{distance}");
    }

    #[test]
    fn meters_scale_kilometers() {
        let km = haversine_distance(40.0, -73.0, 40.001, -73.0);
        let m = haversine_distance_meters(40.0, -73.0, 40.001, -73.0);
        assert!((m - km * 1000.0).abs() < 1e-9);
        assert!((m - 111.19).abs() < 0.5, "{m}");
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let bounds = bounding_box([(40.0, -73.0), (37.422, -122.0841), (38.0, -100.0)]);
        assert_eq!(bounds, Some(((37.422, -122.0841), (40.0, -73.0))));
        assert_eq!(bounding_box(Vec::<(f64, f64)>::new()), None);
    }

    #[test]
    fn validates_ranges() {
        assert!(is_valid_position(90.0, -180.0));
        assert!(!is_valid_position(90.1, 0.0));
        assert!(!is_valid_position(0.0, 180.5));
        assert!(!is_valid_position(f64::NAN, 0.0));
    }
}
