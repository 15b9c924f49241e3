use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{camera::CameraCommand, error::SessionError};

/// One-shot notifications that are not part of the session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum SessionEvent {
    Camera(CameraCommand),
    Error(SessionError),
}
