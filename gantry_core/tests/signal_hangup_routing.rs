#[cfg(all(test, unix))]
mod tests {
    use gantry_core::Signaler;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A hangup must run the hangup chain and nothing else. This pins the
    /// per-class routing: hangup handlers are not funneled through the
    /// interrupt chain.
    #[tokio::test]
    async fn hangup_runs_only_the_hangup_chain() {
        // Given
        let interrupts = Arc::new(AtomicUsize::new(0));
        let hangups = Arc::new(AtomicUsize::new(0));

        let interrupts_probe = interrupts.clone();
        let hangups_probe = hangups.clone();

        let signaler = Signaler::new()
            .on_interrupt(move |_release| {
                interrupts_probe.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_hangup(move |_release| {
                hangups_probe.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_termination(|release| {
                release.release();
                Ok(())
            });

        // When
        let wait = tokio::spawn(signaler.wait_for_signal(|_error| {}));

        tokio::time::sleep(Duration::from_millis(250)).await;

        unsafe {
            libc::raise(libc::SIGHUP);
        }

        // The hangup chain does not release, so the wait keeps going
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!wait.is_finished());

        unsafe {
            libc::raise(libc::SIGTERM);
        }

        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .expect("wait_for_signal should return after termination releases")
            .unwrap();

        // Then
        assert_eq!(hangups.load(Ordering::SeqCst), 1);
        assert_eq!(interrupts.load(Ordering::SeqCst), 0);
    }
}
