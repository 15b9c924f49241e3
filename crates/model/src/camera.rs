use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{coordinate::Coordinate, route::Bounds};

/// One-shot instruction for whatever map camera the presentation layer owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CameraCommand {
    /// Move to `center`, keeping the current zoom.
    Recenter { center: Coordinate },
    /// Frame `bounds` with `padding` screen units on every side.
    FitBounds { bounds: Bounds, padding: f64 },
    ZoomTo { center: Coordinate, zoom: f64 },
}
