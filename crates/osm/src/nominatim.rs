use std::sync::Arc;

use async_trait::async_trait;
use model::Coordinate;
use navigation::{Geocoder, ServiceResult};
use serde::Deserialize;

use crate::{client::OsmApiClient, ApiError};

pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    #[serde(with = "utility::serde::number_or_string")]
    pub lat: f64,
    #[serde(with = "utility::serde::number_or_string")]
    pub lon: f64,
    pub display_name: Option<String>,
}

/// Parses a Nominatim `search` response, keeping the service's ranking.
/// Places outside the valid coordinate range are skipped.
pub fn parse_places(body: &str) -> Result<Vec<Coordinate>, ApiError> {
    let places: Vec<Place> = serde_json::from_str(body)?;
    Ok(places
        .into_iter()
        .map(|place| Coordinate::new(place.lat, place.lon))
        .filter(Coordinate::is_valid)
        .collect())
}

/// Geocoder backed by the Nominatim search API.
pub struct NominatimGeocoder {
    client: Arc<OsmApiClient>,
}

impl NominatimGeocoder {
    pub fn new(client: Arc<OsmApiClient>) -> Self {
        Self { client }
    }

    pub fn search_url(&self, address: &str) -> Result<reqwest::Url, ApiError> {
        let base = format!(
            "{}/search",
            self.client.config.nominatim_url.trim_end_matches('/')
        );
        let limit = MAX_CANDIDATES.to_string();
        reqwest::Url::parse_with_params(
            &base,
            &[("q", address), ("format", "jsonv2"), ("limit", limit.as_str())],
        )
        .map_err(|why| ApiError::Other(why.to_string()))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> ServiceResult<Vec<Coordinate>> {
        let url = self.search_url(address)?;
        let body = self.client.get_text(url).await?;
        let candidates = parse_places(&body)?;
        log::debug!("'{}' has {} candidates", address, candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OsmConfig;

    #[test]
    fn parses_string_coordinates_in_order() {
        let body = r#"[
            {"place_id": 1, "lat": "37.4220", "lon": "-122.0841",
             "display_name": "Google Building 40, 1600 Amphitheatre Parkway"},
            {"place_id": 2, "lat": "37.4275", "lon": "-122.1697"}
        ]"#;
        assert_eq!(
            parse_places(body).unwrap(),
            vec![
                Coordinate::new(37.422, -122.0841),
                Coordinate::new(37.4275, -122.1697)
            ]
        );
    }

    #[test]
    fn empty_result_is_not_an_error() {
        assert!(parse_places("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            parse_places(r#"{"error": "Unable to geocode"}"#),
            Err(ApiError::JsonError(_))
        ));
    }

    #[test]
    fn out_of_range_places_are_skipped() {
        let body = r#"[{"lat": "91.0", "lon": "0"}, {"lat": "1", "lon": "2"}]"#;
        assert_eq!(parse_places(body).unwrap(), vec![Coordinate::new(1.0, 2.0)]);
    }

    #[test]
    fn search_url_encodes_address() {
        let client = OsmApiClient::new(&OsmConfig {
            nominatim_url: "http://localhost:8088/".to_owned(),
            ..Default::default()
        })
        .unwrap();
        let geocoder = NominatimGeocoder::new(Arc::new(client));
        let url = geocoder.search_url("1600 Amphitheatre Parkway").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8088/search?q=1600+Amphitheatre+Parkway&format=jsonv2&limit=5"
        );
    }
}
