use tokio_util::sync::CancellationToken;

/// One-shot gate shared by every handler of every chain of a
/// [`Signaler`](crate::Signaler).
///
/// Invoking [`release`](Release::release) unblocks the caller of
/// [`wait_for_signal`](crate::Signaler::wait_for_signal) exactly once, no
/// matter how many handlers invoke it or how many times. Repeat invocations
/// are defined no-ops, never errors.
///
/// ## Example
///
/// ```
/// use gantry_core::Release;
///
/// let release = Release::new();
///
/// release.release();
/// release.release(); // no additional effect
///
/// assert!(release.is_released());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Release {
    token: CancellationToken,
}

impl Release {
    /// Returns a brand new, untriggered [`Release`].
    pub fn new() -> Self {
        let token = CancellationToken::new();

        Self { token }
    }

    /// Permanently triggers the release, unblocking the signal wait.
    /// Subsequent calls have no additional effect.
    pub fn release(&self) {
        self.token.cancel();
    }

    /// Reports whether the release has been triggered.
    pub fn is_released(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the release is triggered. Resolves immediately if it
    /// already has been.
    pub(crate) async fn released(&self) {
        self.token.cancelled().await;
    }
}
