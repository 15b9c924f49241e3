use std::{any::Any, sync::Arc};

use actors::{
    actor::{Actor, SupervisionStrategy},
    actor_ref::WeakActorRef,
    context::Context,
    handler::{Handler, Message},
};
use async_trait::async_trait;
use futures::StreamExt;
use model::{Coordinate, Fix, RouteResult, SessionEvent, SessionSnapshot};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    services::{Geocoder, Permission, PositionSource, Router},
    session::{Effect, Effects, NavigationSession, RequestId},
    ServiceResult,
};

/// The external collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn Router>,
    pub position_source: Arc<dyn PositionSource>,
}

/// Hosts a [`NavigationSession`] and executes the effects of its transitions.
/// Service calls run in background tasks that report back through a weak
/// address, so results arriving after teardown are dropped.
pub struct SessionActor {
    session: NavigationSession,
    services: Services,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
    events: broadcast::Sender<SessionEvent>,
    subscription: Option<DropGuard>,
}

impl SessionActor {
    pub fn new(
        session: NavigationSession,
        services: Services,
        snapshots: Arc<watch::Sender<SessionSnapshot>>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            session,
            services,
            snapshots,
            events,
            subscription: None,
        }
    }

    fn publish(&self) {
        let snapshot = self.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn emit(&self, event: SessionEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }

    fn apply(&mut self, effects: Effects, context: &Context<Self>) {
        for effect in effects {
            match effect {
                Effect::Geocode { request, address } => {
                    self.spawn_geocode(request, address, context.myself())
                }
                Effect::FetchRoute {
                    request,
                    origin,
                    destination,
                } => self.spawn_route(request, origin, destination, context.myself()),
                Effect::Camera(command) => self.emit(SessionEvent::Camera(command)),
                Effect::Report(error) => self.emit(SessionEvent::Error(error)),
                Effect::RequestPermission => self.spawn_permission(context.myself()),
                Effect::Subscribe => self.subscribe(context.myself()),
            }
        }
        self.publish();
    }

    fn spawn_geocode(&self, request: RequestId, address: String, myself: WeakActorRef<Self>) {
        let geocoder = self.services.geocoder.clone();
        tokio::spawn(async move {
            let result = geocoder.resolve(&address).await;
            if !myself.try_tell(GeocodeFinished { request, result }).await {
                log::debug!("session closed, dropping geocode result for '{}'", address);
            }
        });
    }

    fn spawn_route(
        &self,
        request: RequestId,
        origin: Coordinate,
        destination: Coordinate,
        myself: WeakActorRef<Self>,
    ) {
        let router = self.services.router.clone();
        tokio::spawn(async move {
            let result = router.route(origin, destination).await;
            if !myself.try_tell(RouteFinished { request, result }).await {
                log::debug!("session closed, dropping route {}", request.raw());
            }
        });
    }

    fn spawn_permission(&self, myself: WeakActorRef<Self>) {
        let source = self.services.position_source.clone();
        tokio::spawn(async move {
            let permission = source.request_permission().await;
            myself.try_tell(PermissionResolved(permission)).await;
        });
    }

    fn subscribe(&mut self, myself: WeakActorRef<Self>) {
        if self.subscription.is_some() {
            return;
        }
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let mut stream = self
            .services
            .position_source
            .subscribe(&self.session.config().subscription);
        log::info!("subscribed to position updates");

        tokio::spawn(async move {
            loop {
                let item = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    item = stream.next() => item,
                };
                let delivered = match item {
                    Some(Ok(fix)) => myself.try_tell(PositionUpdate(fix)).await,
                    Some(Err(why)) => {
                        myself.try_tell(LocationFailed(why.to_string())).await
                    }
                    None => {
                        log::info!("position stream ended");
                        break;
                    }
                };
                if !delivered {
                    break;
                }
            }
            log::debug!("position subscription released");
        });
        self.subscription = Some(token.drop_guard());
    }

    fn unsubscribe(&mut self) {
        // dropping the guard cancels the forwarding task
        if self.subscription.take().is_some() {
            log::info!("unsubscribed from position updates");
        }
    }
}

impl Actor for SessionActor {
    fn on_stop(&mut self) {
        self.unsubscribe();
    }

    fn on_fail(&mut self, _: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }
}

macro_rules! message {
    ($name:ident $(( $($field:ty),* ))? => $response:ty) => {
        #[derive(Debug, Clone)]
        pub struct $name $(( $(pub $field),* ))?;

        impl Message for $name {
            type Response = $response;
        }
    };
}

message!(SubmitDestination(String) => ());
message!(ClearDestination => ());
message!(FetchRoute => ());
message!(ToggleTracking => bool);
message!(Start => ());
message!(Begin => ());
message!(DismissError => ());
message!(Close => ());
message!(GetSnapshot => SessionSnapshot);
message!(PositionUpdate(Fix) => ());
message!(LocationFailed(String) => ());
message!(PermissionResolved(Permission) => ());

#[derive(Debug, Clone)]
pub struct GeocodeFinished {
    pub request: RequestId,
    pub result: ServiceResult<Vec<Coordinate>>,
}

impl Message for GeocodeFinished {
    type Response = ();
}

#[derive(Debug, Clone)]
pub struct RouteFinished {
    pub request: RequestId,
    pub result: ServiceResult<RouteResult>,
}

impl Message for RouteFinished {
    type Response = ();
}

#[async_trait]
impl Handler<SubmitDestination> for SessionActor {
    async fn handle(&mut self, message: SubmitDestination, context: &Context<Self>) {
        let effects = self.session.submit_destination(&message.0);
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<ClearDestination> for SessionActor {
    async fn handle(&mut self, _: ClearDestination, context: &Context<Self>) {
        self.session.clear_destination();
        self.apply(vec![], context);
    }
}

#[async_trait]
impl Handler<FetchRoute> for SessionActor {
    async fn handle(&mut self, _: FetchRoute, context: &Context<Self>) {
        let effects = self.session.fetch_route();
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<ToggleTracking> for SessionActor {
    async fn handle(&mut self, _: ToggleTracking, context: &Context<Self>) -> bool {
        let tracking = self.session.toggle_tracking();
        self.apply(vec![], context);
        tracking
    }
}

#[async_trait]
impl Handler<Start> for SessionActor {
    async fn handle(&mut self, _: Start, context: &Context<Self>) {
        let effects = self.session.start();
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<Begin> for SessionActor {
    async fn handle(&mut self, _: Begin, context: &Context<Self>) {
        let effects = self.session.begin();
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<DismissError> for SessionActor {
    async fn handle(&mut self, _: DismissError, context: &Context<Self>) {
        self.session.dismiss_error();
        self.apply(vec![], context);
    }
}

#[async_trait]
impl Handler<Close> for SessionActor {
    async fn handle(&mut self, _: Close, context: &Context<Self>) {
        self.unsubscribe();
        context.stop();
    }
}

#[async_trait]
impl Handler<GetSnapshot> for SessionActor {
    async fn handle(&mut self, _: GetSnapshot, _: &Context<Self>) -> SessionSnapshot {
        self.session.snapshot()
    }
}

#[async_trait]
impl Handler<PositionUpdate> for SessionActor {
    async fn handle(&mut self, message: PositionUpdate, context: &Context<Self>) {
        let effects = self.session.on_position_update(message.0);
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<LocationFailed> for SessionActor {
    async fn handle(&mut self, message: LocationFailed, context: &Context<Self>) {
        let effects = self.session.on_location_error(message.0);
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<PermissionResolved> for SessionActor {
    async fn handle(&mut self, message: PermissionResolved, context: &Context<Self>) {
        let effects = self.session.on_permission(message.0);
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<GeocodeFinished> for SessionActor {
    async fn handle(&mut self, message: GeocodeFinished, context: &Context<Self>) {
        let effects = self.session.on_geocode_result(message.request, message.result);
        self.apply(effects, context);
    }
}

#[async_trait]
impl Handler<RouteFinished> for SessionActor {
    async fn handle(&mut self, message: RouteFinished, context: &Context<Self>) {
        let effects = self.session.on_route_result(message.request, message.result);
        self.apply(effects, context);
    }
}
