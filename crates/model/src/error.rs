use std::{error, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Failures surfaced to the presentation layer. None of them end the
/// session; only `PermissionDenied` stops position updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionError {
    PermissionDenied,
    LocationStream { message: String },
    Lookup { address: String, message: String },
    Route { message: String },
    /// The address resolved to zero candidates.
    NoCandidates { address: String },
}

impl SessionError {
    /// `NoCandidates` is a notice rather than a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::NoCandidates { .. })
    }
}

impl error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::PermissionDenied => write!(f, "Location permission denied."),
            SessionError::LocationStream { message } => {
                write!(f, "Location unavailable: {}", message)
            }
            SessionError::Lookup { address, message } => {
                write!(f, "Could not look up '{}': {}", address, message)
            }
            SessionError::Route { message } => write!(f, "No route: {}", message),
            SessionError::NoCandidates { address } => {
                write!(f, "Address not found: {}", address)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_address_is_only_a_notice() {
        let notice = SessionError::NoCandidates {
            address: "Nowhere 1".to_owned(),
        };
        assert!(!notice.is_failure());
        assert!(SessionError::Route {
            message: "Impossible route between points".to_owned()
        }
        .is_failure());
        assert!(SessionError::PermissionDenied.is_failure());
        assert!(SessionError::Lookup {
            address: "Nowhere 1".to_owned(),
            message: "timeout".to_owned()
        }
        .is_failure());
    }
}
