//! Request identifier propagation for request-scoped diagnostics.
//!
//! Handlers and domain errors run inside a task-local scope set by the HTTP
//! middleware, so any error raised while serving a request can carry the
//! identifier without threading it through every signature.

use std::fmt;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static REQUEST_ID: RequestId;
}

/// Identifier correlating log entries and error responses for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub(crate) Uuid);

impl RequestId {
    /// Create a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically parsed from an inbound header.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Return the identifier for the current task scope, if one is set.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_ID.try_with(|id| *id).ok()
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Run `future` with this identifier installed as the task-local value.
    pub async fn scope<F>(self, future: F) -> F::Output
    where
        F: Future,
    {
        REQUEST_ID.scope(self, future).await
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}
