use std::sync::Arc;

use actors::{actor_ref::ActorRef, run_with_capacity};
use model::{SessionEvent, SessionSnapshot};
use tokio::sync::{broadcast, watch};

use crate::{
    actor::{
        Begin, ClearDestination, Close, DismissError, FetchRoute, GetSnapshot,
        Services, SessionActor, Start, SubmitDestination, ToggleTracking,
    },
    config::SessionConfig,
    services::{Geocoder, PositionSource, Router},
    session::NavigationSession,
    SessionClosed, SessionResult,
};

/// Entry point for a presentation layer: dispatches the session operations
/// and exposes state snapshots plus one-shot events.
///
/// The session lives as long as any clone of its handle. Dropping the last
/// one releases the position subscription.
#[derive(Clone)]
pub struct SessionHandle {
    actor: ActorRef<SessionActor>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn spawn(
        config: SessionConfig,
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn Router>,
        position_source: Arc<dyn PositionSource>,
    ) -> Self {
        let services = Services {
            geocoder,
            router,
            position_source,
        };
        let initial = NavigationSession::new(config.clone());
        let (snapshot_tx, snapshots) = watch::channel(initial.snapshot());
        let snapshot_tx = Arc::new(snapshot_tx);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let factory_events = events.clone();
        let actor = run_with_capacity(config.mailbox_size, move || {
            SessionActor::new(
                NavigationSession::new(config.clone()),
                services.clone(),
                snapshot_tx.clone(),
                factory_events.clone(),
            )
        });

        Self {
            actor,
            snapshots,
            events,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// State after every operation sent so far has been applied.
    pub async fn sync_snapshot(&self) -> SessionResult<SessionSnapshot> {
        self.actor.ask(GetSnapshot).await.map_err(|_| SessionClosed)
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Camera commands and error notifications emitted from now on.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn request_permission_and_begin(&self) -> SessionResult<()> {
        self.actor.tell(Begin).await.map_err(|_| SessionClosed)
    }

    pub async fn submit_destination<S: Into<String>>(&self, text: S) -> SessionResult<()> {
        self.actor
            .tell(SubmitDestination(text.into()))
            .await
            .map_err(|_| SessionClosed)
    }

    pub async fn clear_destination(&self) -> SessionResult<()> {
        self.actor.tell(ClearDestination).await.map_err(|_| SessionClosed)
    }

    pub async fn fetch_route(&self) -> SessionResult<()> {
        self.actor.tell(FetchRoute).await.map_err(|_| SessionClosed)
    }

    /// Returns whether tracking is enabled afterwards.
    pub async fn toggle_tracking(&self) -> SessionResult<bool> {
        self.actor.ask(ToggleTracking).await.map_err(|_| SessionClosed)
    }

    pub async fn start(&self) -> SessionResult<()> {
        self.actor.tell(Start).await.map_err(|_| SessionClosed)
    }

    pub async fn dismiss_error(&self) -> SessionResult<()> {
        self.actor.tell(DismissError).await.map_err(|_| SessionClosed)
    }

    /// Tears the session down for every handle. Service results still in
    /// flight are discarded.
    pub async fn close(self) -> SessionResult<()> {
        self.actor.ask(Close).await.map_err(|_| SessionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.actor.is_closed()
    }
}
