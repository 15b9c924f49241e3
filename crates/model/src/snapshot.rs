use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{coordinate::Coordinate, error::SessionError, route::RouteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    Idle,
    Searching,
    Previewing,
    Navigating,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PermissionState {
    #[default]
    NotRequested,
    Pending,
    Granted,
    Denied,
}

/// Everything a presentation layer needs to render the navigation screen.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub current_position: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub route: Option<RouteResult>,
    pub formatted_distance: Option<String>,
    pub formatted_duration: Option<String>,
    pub tracking: bool,
    pub started: bool,
    pub searching: bool,
    pub loading: bool,
    pub permission: PermissionState,
    pub last_error: Option<SessionError>,
}
