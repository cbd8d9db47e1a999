use crate::error::TransportError;
use futures::future::BoxFuture;

/// Retrieves raw content for an identifier.
///
/// Retry and backoff policy, if any, belongs to the implementation. Entities hold
/// an `Arc<dyn ContentSource>` so one transport (and its connection pool) is shared
/// by every entity of a session.
pub trait ContentSource: Send + Sync {
    fn fetch<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<String, TransportError>>;
}
