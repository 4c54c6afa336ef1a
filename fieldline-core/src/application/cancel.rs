use tokio_util::sync::CancellationToken;

/// Cooperative cancellation shared between a caller and the calls it starts.
///
/// Clones observe the same state. Cancelling is permanent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(CancellationToken);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        self.0.cancelled().await
    }
}
