use crate::capability::Capability;
use crate::error::ItemError;
use crate::item::WorkItem;
use crate::outcome::FetchOutcome;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;

/// Runs one capability invocation under a deadline.
///
/// The invocation runs in its own task, so a hung capability only costs the
/// caller `deadline`, and a panicking one is reported rather than unwinding
/// into the pool. On expiry the task is aborted; whether the underlying I/O
/// actually stops depends on the capability reaching an await point.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    deadline: Duration,
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub async fn invoke(&self, capability: Arc<dyn Capability>, item: WorkItem) -> FetchOutcome {
        let start_time = Instant::now();
        let identifier = item.identifier.clone();
        let mut handle = tokio::spawn(async move { capability.fetch(&identifier).await });

        match tokio::time::timeout(self.deadline, &mut handle).await {
            Ok(Ok(Ok(response))) => {
                FetchOutcome::from_response(item, response, start_time.elapsed())
            }
            Ok(Ok(Err(e))) => FetchOutcome::failed(
                item,
                ItemError::Capability(e.to_string()),
                start_time.elapsed(),
            ),
            Ok(Err(join_error)) => {
                FetchOutcome::failed(item, join_failure(join_error), start_time.elapsed())
            }
            Err(_) => {
                handle.abort();
                log::warn!(
                    "Timed out after {:?}: {}",
                    self.deadline,
                    item.identifier
                );
                FetchOutcome::failed(item, ItemError::Timeout, start_time.elapsed())
            }
        }
    }
}

fn join_failure(error: JoinError) -> ItemError {
    if error.is_panic() {
        ItemError::Panicked(panic_message(error.into_panic().as_ref()))
    } else {
        ItemError::Capability("capability task was cancelled".to_string())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FetchResponse;
    use crate::error::{Error, Result};
    use async_trait::async_trait;

    struct Sleepy(Duration);

    #[async_trait]
    impl Capability for Sleepy {
        async fn fetch(&self, _identifier: &str) -> Result<FetchResponse> {
            tokio::time::sleep(self.0).await;
            Ok(FetchResponse::success(200, "late"))
        }
    }

    struct Faulty;

    #[async_trait]
    impl Capability for Faulty {
        async fn fetch(&self, identifier: &str) -> Result<FetchResponse> {
            if identifier == "panic" {
                panic!("exploded on {identifier}");
            }
            Err(Error::Capability(format!("refused {identifier}")))
        }
    }

    #[tokio::test]
    async fn passes_through_fast_results() {
        let guard = TimeoutGuard::new(Duration::from_secs(1));
        let outcome = guard
            .invoke(Arc::new(Sleepy(Duration::ZERO)), WorkItem::new("a", 0))
            .await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.payload.as_deref(), Some(&b"late"[..]));
    }

    #[tokio::test]
    async fn expires_slow_results() {
        let guard = TimeoutGuard::new(Duration::from_millis(50));
        let started = Instant::now();
        let outcome = guard
            .invoke(Arc::new(Sleepy(Duration::from_secs(30))), WorkItem::new("slow", 0))
            .await;
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!outcome.succeeded);
        assert_eq!(outcome.error.as_deref(), Some("timeout"));
        assert_eq!(outcome.status_code, None);
    }

    #[tokio::test]
    async fn converts_errors_and_panics() {
        let guard = TimeoutGuard::new(Duration::from_secs(1));

        let refused = guard.invoke(Arc::new(Faulty), WorkItem::new("x", 0)).await;
        assert!(!refused.succeeded);
        assert_eq!(refused.error.as_deref(), Some("refused x"));

        let panicked = guard.invoke(Arc::new(Faulty), WorkItem::new("panic", 1)).await;
        assert!(!panicked.succeeded);
        assert_eq!(
            panicked.error.as_deref(),
            Some("capability panicked: exploded on panic")
        );
    }
}
