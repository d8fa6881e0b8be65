use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::Result;

/// A listener on an [`EventBus`](super::EventBus).
///
/// Handlers take the event by value and return the event the next listener
/// should see. Returning an error vetoes the dispatch.
#[async_trait]
pub trait EventHandler<E: Send + 'static>: Send + Sync {
    async fn handle(&self, event: E) -> Result<E>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<E, F, Fut> EventHandler<E> for FnHandler<F>
where
    E: Send + 'static,
    F: Fn(E) -> Fut + Send + Sync,
    Fut: Future<Output = Result<E>> + Send,
{
    async fn handle(&self, event: E) -> Result<E> {
        (self.0)(event).await
    }
}

/// Wraps an async closure as a shareable handler.
///
/// Keep the returned `Arc` around to unsubscribe later; listener identity is
/// the `Arc` allocation.
pub fn handler_fn<E, F, Fut>(f: F) -> Arc<dyn EventHandler<E>>
where
    E: Send + 'static,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<E>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}
