use std::{error::Error, fmt, sync::Arc};

pub mod actor;
pub mod config;
pub mod handle;
pub mod position;
pub mod services;
pub mod session;

pub use config::SessionConfig;
pub use handle::SessionHandle;
pub use services::{
    Accuracy, Geocoder, Permission, PositionSource, PositionStream, Router,
    SubscriptionOptions,
};
pub use session::{Effect, NavigationSession, RequestId};

/// Failure reported by one of the external services at the session boundary.
#[derive(Debug, Clone)]
pub enum ServiceError {
    Unavailable(String),
    InvalidResponse(String),
    Other(Arc<dyn Error + Send + Sync>),
}

impl ServiceError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Arc::new(why))
    }
}

impl Error for ServiceError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::Unavailable(why) => write!(f, "service unavailable: {}", why),
            ServiceError::InvalidResponse(why) => write!(f, "invalid response: {}", why),
            ServiceError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl From<csv::Error> for ServiceError {
    fn from(why: csv::Error) -> Self {
        Self::other(why)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The session actor is gone; the handle can no longer be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed;

impl Error for SessionClosed {}

impl fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "navigation session is closed")
    }
}

pub type SessionResult<T> = Result<T, SessionClosed>;
