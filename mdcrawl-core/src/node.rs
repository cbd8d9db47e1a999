use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    Unfetched,
    Fetched,
    FetchFailed,
}

impl ContentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentState::Unfetched => "unfetched",
            ContentState::Fetched => "fetched",
            ContentState::FetchFailed => "fetch_failed",
        }
    }
}

/// Memoized content of an entity.
///
/// The fetch closure runs at most once for the lifetime of the slot. A failure is
/// memoized as well, so a flaky source is never hit twice for the same entity.
#[derive(Debug, Clone)]
pub enum ContentSlot<T> {
    Unfetched,
    Fetched(T),
    Failed(FetchError),
}

impl<T> Default for ContentSlot<T> {
    fn default() -> Self {
        ContentSlot::Unfetched
    }
}

impl<T> ContentSlot<T> {
    pub fn state(&self) -> ContentState {
        match self {
            ContentSlot::Unfetched => ContentState::Unfetched,
            ContentSlot::Fetched(_) => ContentState::Fetched,
            ContentSlot::Failed(_) => ContentState::FetchFailed,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ContentSlot::Fetched(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchError> {
        match self {
            ContentSlot::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the cached value, running `fetch` only if nothing has been attempted yet.
    pub async fn get_or_fetch<F, Fut>(&mut self, fetch: F) -> Result<&T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if let ContentSlot::Unfetched = self {
            *self = match fetch().await {
                Ok(value) => ContentSlot::Fetched(value),
                Err(error) => ContentSlot::Failed(error),
            };
        }

        match &*self {
            ContentSlot::Fetched(value) => Ok(value),
            ContentSlot::Failed(error) => Err(error.clone()),
            ContentSlot::Unfetched => unreachable!("slot is filled before this match"),
        }
    }

    /// Transitions the slot to `FetchFailed`, dropping any cached value.
    pub fn fail(&mut self, error: FetchError) {
        *self = ContentSlot::Failed(error);
    }
}

/// A materialized, uniquely identified unit of crawled content.
///
/// `depth` and `parent` are fixed when the entity is created. The parent is stored
/// as an id and resolved through the owning graph, never as a pointer.
#[allow(async_fn_in_trait)]
pub trait Node {
    fn id(&self) -> &str;

    fn depth(&self) -> usize;

    fn parent(&self) -> Option<&str>;

    fn content_state(&self) -> ContentState;

    fn failure(&self) -> Option<&FetchError>;

    /// Human-readable label, used as a section heading when rendering.
    fn title(&self) -> Option<String> {
        None
    }

    /// Raw content, fetched on first access and memoized afterwards.
    async fn content(&mut self) -> Result<&str, FetchError>;

    /// Output representation of the content, memoized separately from `content`.
    async fn rendered(&mut self) -> Result<&str, FetchError>;

    /// Records a failure observed outside `content`, e.g. while extracting links.
    fn mark_failed(&mut self, error: FetchError);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_slot_fetches_once() {
        let calls = Cell::new(0);
        let mut slot: ContentSlot<String> = ContentSlot::default();
        assert_eq!(slot.state(), ContentState::Unfetched);

        for _ in 0..3 {
            let value = slot
                .get_or_fetch(|| async {
                    calls.set(calls.get() + 1);
                    Ok("body".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "body");
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(slot.state(), ContentState::Fetched);
    }

    #[tokio::test]
    async fn test_slot_memoizes_failure() {
        let calls = Cell::new(0);
        let mut slot: ContentSlot<String> = ContentSlot::default();

        for _ in 0..2 {
            let err = slot
                .get_or_fetch(|| async {
                    calls.set(calls.get() + 1);
                    Err(TransportError::Status(503).into())
                })
                .await
                .unwrap_err();
            assert_eq!(err, FetchError::Transport(TransportError::Status(503)));
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(slot.state(), ContentState::FetchFailed);
        assert!(slot.value().is_none());
    }

    #[test]
    fn test_fail_drops_cached_value() {
        let mut slot = ContentSlot::Fetched("body".to_string());
        slot.fail(FetchError::InvalidId("x".to_string()));
        assert_eq!(slot.state(), ContentState::FetchFailed);
        assert!(slot.failure().is_some());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ContentState::Unfetched.as_str(), "unfetched");
        assert_eq!(ContentState::FetchFailed.as_str(), "fetch_failed");
    }
}
