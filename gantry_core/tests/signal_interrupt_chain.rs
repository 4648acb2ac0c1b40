#[cfg(all(test, unix))]
mod tests {
    use gantry_core::Signaler;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[tokio::test(flavor = "multi_thread")]
    async fn interrupt_chain_runs_in_order_before_release() {
        // Given
        let journal = Arc::new(Mutex::new(Vec::new()));

        let journal_slow = journal.clone();
        let journal_releasing = journal.clone();

        let signaler = Signaler::new()
            .on_interrupt(move |_release| {
                std::thread::sleep(Duration::from_millis(10));
                journal_slow.lock().unwrap().push("slow");
                Ok(())
            })
            .on_interrupt(move |release| {
                journal_releasing.lock().unwrap().push("releasing");
                release.release();
                Ok(())
            });

        // When
        let wait = tokio::spawn(signaler.wait_for_signal(|_error| {}));

        tokio::time::sleep(Duration::from_millis(250)).await;

        let raised_at = Instant::now();
        unsafe {
            libc::raise(libc::SIGINT);
        }

        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .expect("wait_for_signal should return after the chain completes")
            .unwrap();

        // Then: both handlers ran, in registration order, and the wait could
        // not return before the slow handler finished
        assert!(raised_at.elapsed() >= Duration::from_millis(10));
        assert_eq!(*journal.lock().unwrap(), vec!["slow", "releasing"]);
    }
}
