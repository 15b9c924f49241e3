use async_trait::async_trait;
use futures::stream::BoxStream;
use model::{Coordinate, Fix, RouteResult};
use serde::{Deserialize, Serialize};

use crate::ServiceResult;

pub type PositionStream = BoxStream<'static, ServiceResult<Fix>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accuracy {
    Low,
    Balanced,
    High,
    #[default]
    BestForNavigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionOptions {
    /// Fixes closer than this to the previously delivered one are dropped.
    pub min_distance_meters: f64,
    pub accuracy: Accuracy,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            min_distance_meters: 5.0,
            accuracy: Accuracy::BestForNavigation,
        }
    }
}

/// Device location. Dropping the returned stream ends the subscription.
#[async_trait]
pub trait PositionSource: Send + Sync + 'static {
    async fn request_permission(&self) -> Permission;

    fn subscribe(&self, options: &SubscriptionOptions) -> PositionStream;
}

#[async_trait]
pub trait Geocoder: Send + Sync + 'static {
    /// Candidates for `address`, best match first. An unknown address yields
    /// an empty list, not an error.
    async fn resolve(&self, address: &str) -> ServiceResult<Vec<Coordinate>>;
}

#[async_trait]
pub trait Router: Send + Sync + 'static {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> ServiceResult<RouteResult>;
}
