//! Request correlation identifier.
//!
//! One [`TraceId`] is bound to each request in task-local storage. Errors built
//! anywhere below the handler pick it up through [`TraceId::current`], so the
//! id in a log line matches the `trace-id` header the client saw.
//!
//! Task-locals do not cross `tokio::spawn`; wrap spawned work in
//! [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating a request with its logs and error responses.
///
/// # Examples
/// ```
/// use devcamper::domain::TraceId;
///
/// let upstream = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
/// assert_eq!(TraceId::resolve(Some(upstream)).to_string(), upstream);
/// assert_ne!(TraceId::resolve(Some("not-a-uuid")).to_string(), "not-a-uuid");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse an identifier supplied by an upstream proxy when it is a UUID,
    /// otherwise generate one.
    #[must_use]
    pub fn resolve(incoming: Option<&str>) -> Self {
        incoming
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Identifier bound to the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` bound.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
