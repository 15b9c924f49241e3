use std::{env, error, fmt, sync::Arc};

use navigation::ServiceError;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod nominatim;
pub mod osrm;

pub use client::OsmApiClient;
pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const OSRM_URL: &str = "https://router.project-osrm.org";
pub const USER_AGENT: &str = concat!("navigator/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsmConfig {
    pub nominatim_url: String,
    pub osrm_url: String,
    pub user_agent: String,
    pub rate_limit_per_minute: Option<u64>,
    pub proxy: Option<String>,
}

impl Default for OsmConfig {
    fn default() -> Self {
        Self {
            nominatim_url: NOMINATIM_URL.to_owned(),
            osrm_url: OSRM_URL.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            // public Nominatim allows one request per second
            rate_limit_per_minute: Some(60),
            proxy: None,
        }
    }
}

impl OsmConfig {
    /// Reads overrides from `NOMINATIM_URL`, `OSRM_URL`, `OSM_USER_AGENT`,
    /// `OSM_PROXY` and `OSM_RATE_LIMIT_PER_MINUTE` (0 disables the limit).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rate_limit_per_minute = match env::var("OSM_RATE_LIMIT_PER_MINUTE") {
            Ok(value) => match value.parse::<u64>() {
                Ok(0) => None,
                Ok(limit) => Some(limit),
                Err(_) => {
                    log::warn!("ignoring invalid OSM_RATE_LIMIT_PER_MINUTE '{}'", value);
                    defaults.rate_limit_per_minute
                }
            },
            Err(_) => defaults.rate_limit_per_minute,
        };

        Self {
            nominatim_url: env::var("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            osrm_url: env::var("OSRM_URL").unwrap_or(defaults.osrm_url),
            user_agent: env::var("OSM_USER_AGENT").unwrap_or(defaults.user_agent),
            rate_limit_per_minute,
            proxy: env::var("OSM_PROXY").ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    RateLimitReached,
    NoRoute(String),
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::InvalidResponse {
                status_code,
                url,
                response,
            } => match response {
                Some(text) => {
                    write!(f, "Invalid Response ({}) {}: {}", status_code, text, url)
                }
                None => write!(f, "Invalid Response({}) {}", status_code, url),
            },
            ApiError::RateLimitReached => write!(f, "Rate limit reached."),
            ApiError::NoRoute(why) => write!(f, "No route found: {}", why),
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}

impl From<ApiError> for ServiceError {
    fn from(why: ApiError) -> Self {
        match why {
            ApiError::RequestError(_) | ApiError::RateLimitReached => {
                ServiceError::Unavailable(why.to_string())
            }
            ApiError::JsonError(_)
            | ApiError::InvalidResponse { .. }
            | ApiError::NoRoute(_) => ServiceError::InvalidResponse(why.to_string()),
            ApiError::Other(_) => ServiceError::other(why),
        }
    }
}
