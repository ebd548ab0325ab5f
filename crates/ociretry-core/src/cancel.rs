//! Cancellation-aware futures.
//!
//! Provides the [`OrCancelExt`] trait for racing any future against a
//! tokio `CancellationToken`. Whatever future loses the race is dropped, so
//! resources it owns (a child process spawned with `kill_on_drop`, a timer)
//! are released on the spot.

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Error returned when a future is cancelled before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Extension trait for making futures cancellable.
#[async_trait]
pub trait OrCancelExt: Sized {
    /// Output of the wrapped future.
    type Output;

    /// Race this future against the cancellation token.
    ///
    /// Returns `Ok(output)` if the future completes first, or
    /// `Err(Cancelled)` if the token fires first. A token that is already
    /// cancelled wins without polling the future.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, Cancelled>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, Cancelled> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            res = self => Ok(res),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::task;
    use tokio::time::sleep;

    #[tokio::test]
    async fn returns_ok_when_future_completes_first() {
        let token = CancellationToken::new();

        let result = async { 42 }.or_cancel(&token).await;

        assert_eq!(Ok(42), result);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_err_when_token_cancelled_first() {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let cancel_handle = task::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            token_clone.cancel();
        });

        let result = async {
            sleep(Duration::from_secs(60)).await;
            7
        }
        .or_cancel(&token)
        .await;

        cancel_handle.await.unwrap();
        assert_eq!(Err(Cancelled), result);
    }

    #[tokio::test]
    async fn already_cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();

        let result = async { 1 }.or_cancel(&token).await;

        assert_eq!(Err(Cancelled), result);
    }
}
