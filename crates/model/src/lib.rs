pub use serde_with;

pub mod camera;
pub mod coordinate;
pub mod error;
pub mod event;
pub mod route;
pub mod snapshot;

pub use camera::CameraCommand;
pub use coordinate::{Coordinate, Fix};
pub use error::SessionError;
pub use event::SessionEvent;
pub use route::{Bounds, RouteResult};
pub use snapshot::{PermissionState, SessionMode, SessionSnapshot};

/// Types that can produce a representative instance, used for documentation
/// and tests of presentation layers.
pub trait ExampleData {
    fn example_data() -> Self;
}

impl ExampleData for SessionSnapshot {
    fn example_data() -> Self {
        let route = RouteResult::new(
            vec![
                Coordinate::new(54.3233, 10.1228),
                Coordinate::new(54.3301, 10.1402),
                Coordinate::new(54.3390, 10.1512),
            ],
            2480.0,
            312.0,
        );
        SessionSnapshot {
            mode: SessionMode::Previewing,
            current_position: Some(Coordinate::new(54.3233, 10.1228)),
            destination: Some(Coordinate::new(54.3390, 10.1512)),
            formatted_distance: Some(route.formatted_distance()),
            formatted_duration: Some(route.formatted_duration()),
            route: Some(route),
            tracking: true,
            started: false,
            searching: false,
            loading: false,
            permission: PermissionState::Granted,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_snapshot_serializes_without_absent_fields() {
        let json = serde_json::to_value(SessionSnapshot::example_data()).unwrap();
        assert_eq!(json["mode"], "previewing");
        assert_eq!(json["formattedDistance"], "2.5 km");
        assert_eq!(json["formattedDuration"], "5min");
        assert!(json.get("lastError").is_none());
    }

    #[test]
    fn events_are_tagged() {
        let event = SessionEvent::Camera(CameraCommand::Recenter {
            center: Coordinate::new(1.0, 2.0),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "camera");
        assert_eq!(json["data"]["type"], "recenter");

        let event = SessionEvent::Error(SessionError::PermissionDenied);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["kind"], "permissionDenied");
    }
}
