use std::sync::Arc;

use async_trait::async_trait;
use model::{Coordinate, RouteResult};
use navigation::{Router, ServiceResult};
use serde::Deserialize;

use crate::{client::OsmApiClient, ApiError};

pub const PROFILE: &str = "driving";

#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub geometry: Geometry,
    pub distance: f64,
    pub duration: f64,
}

/// GeoJSON line string; positions are `[longitude, latitude]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl From<Route> for RouteResult {
    fn from(route: Route) -> Self {
        RouteResult::new(
            route
                .geometry
                .coordinates
                .into_iter()
                .map(|[longitude, latitude]| Coordinate::new(latitude, longitude))
                .collect(),
            route.distance,
            route.duration,
        )
    }
}

/// Parses an OSRM `route` response. The first route is used; a response
/// without routes is an error.
pub fn parse_route(body: &str) -> Result<RouteResult, ApiError> {
    let response: RouteResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(ApiError::NoRoute(
            response.message.unwrap_or(response.code),
        ));
    }
    response
        .routes
        .into_iter()
        .next()
        .map(RouteResult::from)
        .ok_or_else(|| ApiError::NoRoute("response contains no routes".to_owned()))
}

/// Router backed by an OSRM server.
pub struct OsrmRouter {
    client: Arc<OsmApiClient>,
}

impl OsrmRouter {
    pub fn new(client: Arc<OsmApiClient>) -> Self {
        Self { client }
    }

    pub fn route_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<reqwest::Url, ApiError> {
        let url = format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.client.config.osrm_url.trim_end_matches('/'),
            PROFILE,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude,
        );
        reqwest::Url::parse(&url).map_err(|why| ApiError::Other(why.to_string()))
    }
}

#[async_trait]
impl Router for OsrmRouter {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> ServiceResult<RouteResult> {
        let url = self.route_url(origin, destination)?;
        let body = match self.client.get_text(url).await {
            Ok(body) => body,
            // OSRM explains failures like NoRoute in the body of a 400
            Err(ApiError::InvalidResponse {
                status_code,
                url,
                response: Some(body),
            }) => {
                let why = match parse_route(&body) {
                    Err(ApiError::NoRoute(message)) => ApiError::NoRoute(message),
                    _ => ApiError::InvalidResponse {
                        status_code,
                        url,
                        response: Some(body),
                    },
                };
                return Err(why.into());
            }
            Err(why) => return Err(why.into()),
        };
        Ok(parse_route(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OsmConfig;

    #[test]
    fn swaps_axis_order() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-73.0, 40.0], [-95.0, 39.0], [-122.0841, 37.422]]
                },
                "distance": 5000000.0,
                "duration": 18000.0,
                "legs": []
            }],
            "waypoints": []
        }"#;
        let route = parse_route(body).unwrap();
        assert_eq!(
            route.points,
            vec![
                Coordinate::new(40.0, -73.0),
                Coordinate::new(39.0, -95.0),
                Coordinate::new(37.422, -122.0841)
            ]
        );
        assert_eq!(route.formatted_distance(), "5000.0 km");
        assert_eq!(route.formatted_duration(), "5h 0min");
    }

    #[test]
    fn empty_routes_is_an_error() {
        let body = r#"{"code": "Ok", "routes": []}"#;
        assert!(matches!(parse_route(body), Err(ApiError::NoRoute(_))));
    }

    #[test]
    fn error_code_is_an_error() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        match parse_route(body) {
            Err(ApiError::NoRoute(message)) => {
                assert_eq!(message, "Impossible route between points")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            parse_route("<html>502</html>"),
            Err(ApiError::JsonError(_))
        ));
        assert!(parse_route(r#"{"code": "Ok", "routes": [{"distance": 1}]}"#).is_err());
    }

    #[test]
    fn route_url_uses_lon_lat_order() {
        let client = OsmApiClient::new(&OsmConfig {
            osrm_url: "http://localhost:5000".to_owned(),
            ..Default::default()
        })
        .unwrap();
        let router = OsrmRouter::new(Arc::new(client));
        let url = router
            .route_url(Coordinate::new(40.0, -73.0), Coordinate::new(37.422, -122.0841))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/route/v1/driving/-73,40;-122.0841,37.422?overview=full&geometries=geojson"
        );
    }
}
