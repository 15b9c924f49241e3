use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::SubscriptionOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub subscription: SubscriptionOptions,
    /// Zoom level used when navigation starts.
    pub navigation_zoom: f64,
    pub fit_bounds_padding: f64,
    /// Minimum time between route refreshes caused by position updates.
    /// `None` refreshes on every fix.
    pub route_refresh_interval_ms: Option<u64>,
    pub mailbox_size: usize,
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn route_refresh_interval(&self) -> Option<Duration> {
        self.route_refresh_interval_ms.map(Duration::from_millis)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            subscription: SubscriptionOptions::default(),
            navigation_zoom: 17.0,
            fit_bounds_padding: 50.0,
            route_refresh_interval_ms: None,
            mailbox_size: actors::DEFAULT_MAILBOX_SIZE,
            event_capacity: 64,
        }
    }
}
