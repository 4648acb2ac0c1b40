#[cfg(all(test, unix))]
mod tests {
    use gantry_core::Signaler;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn termination_signal_releases_the_wait() {
        // Given
        let invoked = Arc::new(AtomicBool::new(false));
        let invoked_probe = invoked.clone();

        let signaler = Signaler::new().on_termination(move |release| {
            invoked_probe.store(true, Ordering::SeqCst);
            release.release();
            Ok(())
        });

        // When
        let wait = tokio::spawn(signaler.wait_for_signal(|_error| {}));

        // Give the subscription a chance to install
        tokio::time::sleep(Duration::from_millis(250)).await;

        unsafe {
            libc::raise(libc::SIGTERM);
        }

        // Then: the wait returns promptly, without any other signal
        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .expect("wait_for_signal should return promptly after release")
            .unwrap();

        assert!(invoked.load(Ordering::SeqCst));
    }
}
