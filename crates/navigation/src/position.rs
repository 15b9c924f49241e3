use std::{io, path::Path, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{future, Stream, StreamExt};
use model::{Coordinate, Fix};
use serde::Deserialize;

use crate::{
    services::{Permission, PositionSource, PositionStream, SubscriptionOptions},
    ServiceResult,
};

/// Drops fixes closer than `min_distance_meters` to the last fix let through.
/// Errors always pass.
pub fn filter_min_distance<S>(
    stream: S,
    min_distance_meters: f64,
) -> impl Stream<Item = ServiceResult<Fix>>
where
    S: Stream<Item = ServiceResult<Fix>>,
{
    let mut last: Option<Coordinate> = None;
    stream.filter(move |item| {
        let keep = match item {
            Ok(fix) => match last {
                Some(previous)
                    if previous.distance_meters(&fix.coordinate) < min_distance_meters =>
                {
                    false
                }
                _ => {
                    last = Some(fix.coordinate);
                    true
                }
            },
            Err(_) => true,
        };
        future::ready(keep)
    })
}

#[derive(Debug, Deserialize)]
struct FixRecord {
    latitude: f64,
    longitude: f64,
    accuracy: Option<f64>,
    timestamp: Option<DateTime<Utc>>,
}

impl From<FixRecord> for Fix {
    fn from(record: FixRecord) -> Self {
        Fix {
            coordinate: Coordinate::new(record.latitude, record.longitude),
            accuracy_meters: record.accuracy,
            timestamp: record.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

/// Plays back a recorded track, one fix per `interval`.
///
/// CSV input needs a header with `latitude,longitude` and optionally
/// `accuracy` (meters) and `timestamp` (RFC 3339).
#[derive(Debug, Clone)]
pub struct ReplayPositionSource {
    fixes: Vec<Fix>,
    interval: Duration,
    permission: Permission,
}

impl ReplayPositionSource {
    pub fn new(fixes: Vec<Fix>, interval: Duration) -> Self {
        Self {
            fixes,
            interval,
            permission: Permission::Granted,
        }
    }

    pub fn from_reader<R: io::Read>(reader: R, interval: Duration) -> ServiceResult<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let fixes = reader
            .deserialize::<FixRecord>()
            .map(|record| record.map(Fix::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(fixes, interval))
    }

    pub fn from_path<P: AsRef<Path>>(path: P, interval: Duration) -> ServiceResult<Self> {
        let file = std::fs::File::open(path).map_err(crate::ServiceError::other)?;
        Self::from_reader(file, interval)
    }

    /// Answer given to permission requests. Defaults to granted.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }
}

#[async_trait]
impl PositionSource for ReplayPositionSource {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    fn subscribe(&self, options: &SubscriptionOptions) -> PositionStream {
        let interval = self.interval;
        let fixes = futures::stream::iter(self.fixes.clone())
            .then(move |fix| async move {
                tokio::time::sleep(interval).await;
                Ok(fix)
            });
        filter_min_distance(fixes, options.min_distance_meters).boxed()
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::ServiceError;

    #[tokio::test]
    async fn filter_drops_fixes_closer_than_threshold() {
        let fixes = vec![
            Ok(Fix::now(40.0, -73.0)),
            // ~1.1 m north
            Ok(Fix::now(40.00001, -73.0)),
            Err(ServiceError::Unavailable("gps".to_owned())),
            // ~11 m north of the first fix
            Ok(Fix::now(40.0001, -73.0)),
        ];
        let passed = filter_min_distance(stream::iter(fixes), 5.0)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(passed.len(), 3);
        assert_eq!(
            passed[0].as_ref().unwrap().coordinate,
            Coordinate::new(40.0, -73.0)
        );
        assert!(passed[1].is_err());
        assert_eq!(
            passed[2].as_ref().unwrap().coordinate,
            Coordinate::new(40.0001, -73.0)
        );
    }

    #[tokio::test]
    async fn zero_threshold_keeps_everything() {
        let fixes = vec![Ok(Fix::now(1.0, 1.0)), Ok(Fix::now(1.0, 1.0))];
        let passed = filter_min_distance(stream::iter(fixes), 0.0)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(passed.len(), 2);
    }

    #[test]
    fn reads_csv_track() {
        let csv = "latitude, longitude, accuracy, timestamp\n\
                   54.3233, 10.1228, 4.5, 2024-05-01T10:00:00Z\n\
                   54.3240, 10.1230, , \n";
        let source = ReplayPositionSource::from_reader(csv.as_bytes(), Duration::ZERO).unwrap();
        let fixes = source.fixes();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].accuracy_meters, Some(4.5));
        assert_eq!(fixes[0].timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(fixes[1].coordinate, Coordinate::new(54.324, 10.123));
        assert_eq!(fixes[1].accuracy_meters, None);
    }

    #[test]
    fn rejects_malformed_csv() {
        let csv = "latitude,longitude\nnorth,10.0\n";
        assert!(ReplayPositionSource::from_reader(csv.as_bytes(), Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn replays_filtered_fixes() {
        let source = ReplayPositionSource::new(
            vec![
                Fix::now(54.0, 10.0),
                Fix::now(54.0, 10.0),
                Fix::now(54.01, 10.0),
            ],
            Duration::from_millis(1),
        );
        assert_eq!(source.request_permission().await, Permission::Granted);
        let fixes = source
            .subscribe(&SubscriptionOptions::default())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(fixes.len(), 2);

        let denied = source.with_permission(Permission::Denied);
        assert_eq!(denied.request_permission().await, Permission::Denied);
    }
}
