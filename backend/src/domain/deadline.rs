//! Optional per-call deadline shared by every store caller.

use std::future::Future;
use std::time::Duration;

/// Run a store call under an optional deadline, mapping expiry to `on_timeout`.
pub(crate) async fn within_deadline<T, E, Fut>(
    deadline: Option<Duration>,
    operation: &'static str,
    call: Fut,
    on_timeout: impl FnOnce(&'static str) -> E,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_elapsed| Err(on_timeout(operation))),
        None => call.await,
    }
}
