use chrono::Local;
use tokio::sync::RwLock;

use crate::{ApiError, OsmConfig};

struct OsmApiClientState {
    pub available_requests: u64,
    pub last_refill: chrono::DateTime<Local>,
}

/// HTTP client shared by the geocoder and the router. Sends the configured
/// user agent and enforces the per-minute request budget.
pub struct OsmApiClient {
    pub config: OsmConfig,
    http: reqwest::Client,
    state: RwLock<OsmApiClientState>,
}

impl OsmApiClient {
    pub fn new(config: &OsmConfig) -> Result<Self, ApiError> {
        /* build the http client with optional proxy */
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(proxy_url) = &config.proxy {
            log::info!("Using proxy '{proxy_url}'.");
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            config: config.clone(),
            http: builder.build()?,
            state: RwLock::new(OsmApiClientState {
                available_requests: config.rate_limit_per_minute.unwrap_or(0),
                last_refill: chrono::offset::Local::now(),
            }),
        })
    }

    pub async fn available_requests(&self) -> u64 {
        self.state.read().await.available_requests
    }

    async fn try_decrement_available_requests(&self) -> Result<(), ApiError> {
        if let Some(rate_limit_minutes) = self.config.rate_limit_per_minute {
            let mut state = self.state.write().await;

            let minutes_since_last_request =
                (chrono::offset::Local::now() - state.last_refill).num_minutes();
            if minutes_since_last_request >= 1 {
                state.available_requests = rate_limit_minutes;
                state.last_refill = chrono::offset::Local::now();
            }

            if state.available_requests != 0 {
                state.available_requests -= 1;
            } else {
                return Err(ApiError::RateLimitReached);
            }
        }
        Ok(())
    }

    /// Fetch the body of `url`; any status other than 200 is an error.
    pub async fn get_text(&self, url: reqwest::Url) -> Result<String, ApiError> {
        self.try_decrement_available_requests().await?;

        log::debug!("Requesting '{url}'.");
        let response = self.http.get(url.clone()).send().await?;

        /* parse response */
        match response.status() {
            reqwest::StatusCode::OK => Ok(response.text().await?),
            other => match response.text().await {
                Ok(val) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url: url.to_string(),
                    response: Some(val),
                }),
                Err(_) => Err(ApiError::InvalidResponse {
                    status_code: other,
                    url: url.to_string(),
                    response: None,
                }),
            },
        }
    }
}
