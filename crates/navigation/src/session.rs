use std::time::Instant;

use model::{
    Bounds, CameraCommand, Coordinate, Fix, PermissionState, RouteResult,
    SessionError, SessionMode, SessionSnapshot,
};

use crate::{config::SessionConfig, services::Permission, ServiceResult};

/// Sequence number attached to every outgoing service request. Later requests
/// always carry larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Side effects requested by a transition. The session never performs I/O
/// itself; whoever drives it executes these and feeds the outcomes back.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Geocode {
        request: RequestId,
        address: String,
    },
    FetchRoute {
        request: RequestId,
        origin: Coordinate,
        destination: Coordinate,
    },
    Camera(CameraCommand),
    Report(SessionError),
    RequestPermission,
    Subscribe,
}

pub type Effects = Vec<Effect>;

/// The navigation state machine.
///
/// Outcomes of geocode and route requests are applied only when they are
/// still relevant: a geocode result must answer the latest submitted address,
/// a route result must have been requested for the current destination and be
/// newer than the last route applied.
#[derive(Debug, Clone)]
pub struct NavigationSession {
    config: SessionConfig,
    current_position: Option<Coordinate>,
    destination: Option<Coordinate>,
    route: Option<RouteResult>,
    tracking: bool,
    started: bool,
    searching: bool,
    loading: bool,
    permission: PermissionState,
    last_error: Option<SessionError>,
    next_request: u64,
    pending_geocode: Option<(RequestId, String)>,
    route_floor: RequestId,
    route_applied: Option<RequestId>,
    last_route_request: Option<Instant>,
}

impl NavigationSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            current_position: None,
            destination: None,
            route: None,
            tracking: true,
            started: false,
            searching: false,
            loading: true,
            permission: PermissionState::NotRequested,
            last_error: None,
            next_request: 0,
            pending_geocode: None,
            route_floor: RequestId(0),
            route_applied: None,
            last_route_request: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_position(&self) -> Option<Coordinate> {
        self.current_position
    }

    pub fn destination(&self) -> Option<Coordinate> {
        self.destination
    }

    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn mode(&self) -> SessionMode {
        if self.searching {
            SessionMode::Searching
        } else if self.destination.is_none() {
            SessionMode::Idle
        } else if self.started {
            SessionMode::Navigating
        } else {
            SessionMode::Previewing
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode(),
            current_position: self.current_position,
            destination: self.destination,
            formatted_distance: self.route.as_ref().map(RouteResult::formatted_distance),
            formatted_duration: self.route.as_ref().map(RouteResult::formatted_duration),
            route: self.route.clone(),
            tracking: self.tracking,
            started: self.started,
            searching: self.searching,
            loading: self.loading,
            permission: self.permission,
            last_error: self.last_error.clone(),
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn report(&mut self, error: SessionError) -> Effect {
        self.last_error = Some(error.clone());
        Effect::Report(error)
    }

    /// Starts a lookup for `text`. Surrounding whitespace is trimmed, so an
    /// empty or whitespace-only text clears the destination instead of
    /// querying the geocoder. Any lookup still in flight is superseded.
    pub fn submit_destination(&mut self, text: &str) -> Effects {
        let address = text.trim();
        if address.is_empty() {
            self.clear_destination();
            return vec![];
        }

        let request = self.next_request_id();
        log::debug!("geocoding '{}' as request {}", address, request.0);
        self.pending_geocode = Some((request, address.to_owned()));
        self.searching = true;
        vec![Effect::Geocode {
            request,
            address: address.to_owned(),
        }]
    }

    pub fn on_geocode_result(
        &mut self,
        request: RequestId,
        result: ServiceResult<Vec<Coordinate>>,
    ) -> Effects {
        let address = match self.pending_geocode.take() {
            Some((pending, address)) if pending == request => address,
            other => {
                log::debug!("discarding stale geocode result {}", request.0);
                self.pending_geocode = other;
                return vec![];
            }
        };
        self.searching = false;
        self.started = false;

        match result {
            Ok(candidates) => match candidates.first() {
                Some(destination) => {
                    log::info!(
                        "destination '{}' resolved to {:?}",
                        address,
                        destination
                    );
                    self.set_destination(Some(*destination));
                    self.request_route(true)
                }
                None => {
                    log::info!("no candidates for '{}'", address);
                    self.set_destination(None);
                    vec![self.report(SessionError::NoCandidates { address })]
                }
            },
            Err(why) => {
                log::warn!("geocoding '{}' failed: {}", address, why);
                self.set_destination(None);
                vec![self.report(SessionError::Lookup {
                    address,
                    message: why.to_string(),
                })]
            }
        }
    }

    /// Replaces the destination. The current route and every route request
    /// still in flight belong to the previous destination and are dropped.
    fn set_destination(&mut self, destination: Option<Coordinate>) {
        self.destination = destination;
        self.route = None;
        self.route_applied = None;
        self.route_floor = RequestId(self.next_request + 1);
        if destination.is_none() {
            self.started = false;
        }
    }

    /// Requests a route from the current position to the destination. Does
    /// nothing without a destination or before the first fix.
    pub fn fetch_route(&mut self) -> Effects {
        self.request_route(true)
    }

    fn request_route(&mut self, force: bool) -> Effects {
        let Some(destination) = self.destination else {
            return vec![];
        };
        let Some(origin) = self.current_position else {
            log::debug!("no position yet, route request deferred");
            return vec![];
        };
        if !force {
            if let (Some(interval), Some(last)) =
                (self.config.route_refresh_interval(), self.last_route_request)
            {
                if last.elapsed() < interval {
                    return vec![];
                }
            }
        }

        let request = self.next_request_id();
        self.last_route_request = Some(Instant::now());
        vec![Effect::FetchRoute {
            request,
            origin,
            destination,
        }]
    }

    pub fn on_route_result(
        &mut self,
        request: RequestId,
        result: ServiceResult<RouteResult>,
    ) -> Effects {
        let Some(destination) = self.destination else {
            log::debug!("discarding route {} without destination", request.0);
            return vec![];
        };
        if request < self.route_floor {
            log::debug!("discarding route {} for old destination", request.0);
            return vec![];
        }
        if self.route_applied.is_some_and(|applied| applied >= request) {
            log::debug!("discarding route {} older than current route", request.0);
            return vec![];
        }

        match result {
            Ok(route) => {
                log::info!(
                    "route {}: {} / {}",
                    request.0,
                    route.formatted_distance(),
                    route.formatted_duration()
                );
                self.route = Some(route);
                self.route_applied = Some(request);
                if matches!(self.last_error, Some(SessionError::Route { .. })) {
                    self.last_error = None;
                }
                if self.started {
                    return vec![];
                }
                let points = self
                    .current_position
                    .iter()
                    .chain(std::iter::once(&destination))
                    .collect::<Vec<_>>();
                Bounds::from_points(points)
                    .map(|bounds| {
                        Effect::Camera(CameraCommand::FitBounds {
                            bounds,
                            padding: self.config.fit_bounds_padding,
                        })
                    })
                    .into_iter()
                    .collect()
            }
            Err(why) => {
                log::warn!("route request {} failed: {}", request.0, why);
                vec![self.report(SessionError::Route {
                    message: why.to_string(),
                })]
            }
        }
    }

    pub fn on_position_update(&mut self, fix: Fix) -> Effects {
        if !self.tracking || self.permission == PermissionState::Denied {
            return vec![];
        }
        if !fix.coordinate.is_valid() {
            log::warn!("ignoring invalid fix {:?}", fix.coordinate);
            return vec![];
        }

        let position = fix.coordinate;
        self.current_position = Some(position);
        self.loading = false;

        if self.destination.is_some() {
            let mut effects = self.request_route(false);
            if self.started {
                effects.push(Effect::Camera(CameraCommand::Recenter { center: position }));
            }
            effects
        } else {
            vec![Effect::Camera(CameraCommand::Recenter { center: position })]
        }
    }

    /// Flips tracking and returns the new value.
    pub fn toggle_tracking(&mut self) -> bool {
        self.tracking = !self.tracking;
        self.tracking
    }

    /// Forgets destination and route. A lookup still in flight is abandoned.
    pub fn clear_destination(&mut self) {
        if self.pending_geocode.take().is_some() {
            log::debug!("abandoning pending geocode");
        }
        self.searching = false;
        self.set_destination(None);
    }

    pub fn start(&mut self) -> Effects {
        if self.destination.is_none() {
            return vec![];
        }
        self.started = true;

        let mut effects = vec![];
        if let Some(center) = self.current_position {
            effects.push(Effect::Camera(CameraCommand::ZoomTo {
                center,
                zoom: self.config.navigation_zoom,
            }));
        }
        effects.extend(self.request_route(true));
        effects
    }

    /// Asks for location permission unless a request is pending or already
    /// granted. After a denial this acts as a manual retry.
    pub fn begin(&mut self) -> Effects {
        match self.permission {
            PermissionState::Pending | PermissionState::Granted => vec![],
            PermissionState::NotRequested | PermissionState::Denied => {
                self.permission = PermissionState::Pending;
                vec![Effect::RequestPermission]
            }
        }
    }

    pub fn on_permission(&mut self, permission: Permission) -> Effects {
        if self.permission != PermissionState::Pending {
            log::debug!("ignoring unexpected permission answer {:?}", permission);
            return vec![];
        }
        match permission {
            Permission::Granted => {
                self.permission = PermissionState::Granted;
                if matches!(self.last_error, Some(SessionError::PermissionDenied)) {
                    self.last_error = None;
                }
                vec![Effect::Subscribe]
            }
            Permission::Denied => {
                log::warn!("location permission denied");
                self.permission = PermissionState::Denied;
                self.loading = false;
                vec![self.report(SessionError::PermissionDenied)]
            }
        }
    }

    pub fn on_location_error(&mut self, message: String) -> Effects {
        log::warn!("location stream failed: {}", message);
        self.loading = false;
        vec![self.report(SessionError::LocationStream { message })]
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
