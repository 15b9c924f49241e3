#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use model::{Coordinate, Fix, RouteResult, SessionSnapshot};
use navigation::{
    Geocoder, Permission, PositionSource, PositionStream, Router, ServiceError,
    ServiceResult, SessionConfig, SessionHandle, SubscriptionOptions,
};
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct FakeGeocoder {
    answers: Mutex<HashMap<String, ServiceResult<Vec<Coordinate>>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    completed: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, address: &str, result: ServiceResult<Vec<Coordinate>>) {
        self.answers
            .lock()
            .unwrap()
            .insert(address.to_owned(), result);
    }

    /// Holds lookups of `address` until the returned notify is triggered.
    pub fn gate(&self, address: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(address.to_owned(), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, address: &str) -> ServiceResult<Vec<Coordinate>> {
        self.calls.lock().unwrap().push(address.to_owned());
        let gate = self.gates.lock().unwrap().get(address).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or(Ok(vec![]));
        self.completed.fetch_add(1, Ordering::SeqCst);
        answer
    }
}

pub struct FakeRouter {
    result: Mutex<ServiceResult<RouteResult>>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl FakeRouter {
    pub fn new(result: ServiceResult<RouteResult>) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(result),
            calls: Mutex::new(vec![]),
        })
    }

    pub fn set_result(&self, result: ServiceResult<RouteResult>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Router for FakeRouter {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> ServiceResult<RouteResult> {
        self.calls.lock().unwrap().push((origin, destination));
        self.result.lock().unwrap().clone()
    }
}

pub struct FakePositionSource {
    permission: Permission,
    sender: mpsc::UnboundedSender<ServiceResult<Fix>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<ServiceResult<Fix>>>>,
    subscriptions: AtomicUsize,
}

impl FakePositionSource {
    pub fn new(permission: Permission) -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            permission,
            sender,
            receiver: Mutex::new(Some(receiver)),
            subscriptions: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, fix: Fix) {
        // the session may already have released the stream
        let _ = self.sender.send(Ok(fix));
    }

    pub fn fail(&self, message: &str) {
        let _ = self
            .sender
            .send(Err(ServiceError::Unavailable(message.to_owned())));
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Resolves once the subscriber dropped its stream.
    pub async fn released(&self) {
        tokio::time::timeout(TIMEOUT, self.sender.closed())
            .await
            .expect("subscription was not released");
    }
}

#[async_trait]
impl PositionSource for FakePositionSource {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    fn subscribe(&self, _: &SubscriptionOptions) -> PositionStream {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        match self.receiver.lock().unwrap().take() {
            Some(receiver) => UnboundedReceiverStream::new(receiver).boxed(),
            None => stream::empty().boxed(),
        }
    }
}

pub struct Fixture {
    pub geocoder: Arc<FakeGeocoder>,
    pub router: Arc<FakeRouter>,
    pub source: Arc<FakePositionSource>,
    pub handle: SessionHandle,
}

impl Fixture {
    pub fn new(permission: Permission, route: ServiceResult<RouteResult>) -> Self {
        init_logging();
        let geocoder = FakeGeocoder::new();
        let router = FakeRouter::new(route);
        let source = FakePositionSource::new(permission);
        let handle = SessionHandle::spawn(
            SessionConfig::default(),
            geocoder.clone(),
            router.clone(),
            source.clone(),
        );
        Self {
            geocoder,
            router,
            source,
            handle,
        }
    }

    /// Grants permission and waits until the first fix is applied.
    pub async fn begin_at(&self, latitude: f64, longitude: f64) {
        self.handle.request_permission_and_begin().await.unwrap();
        self.source.push(Fix::now(latitude, longitude));
        wait_until(&self.handle, |snapshot| {
            snapshot.current_position == Some(Coordinate::new(latitude, longitude))
        })
        .await;
    }
}

pub async fn wait_until<F>(handle: &SessionHandle, predicate: F) -> SessionSnapshot
where
    F: Fn(&SessionSnapshot) -> bool,
{
    let mut snapshots = handle.subscribe();
    let snapshot = tokio::time::timeout(TIMEOUT, snapshots.wait_for(|s| predicate(s)))
        .await
        .expect("timed out waiting for session state")
        .expect("session closed")
        .clone();
    snapshot
}

/// Gives background tasks a chance to deliver results.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
