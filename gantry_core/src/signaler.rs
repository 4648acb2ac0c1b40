use self::release::Release;
use crate::subsystem::BoxError;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tokio::sync::mpsc::{Receiver, Sender, channel};
use tracing::{info, warn};

pub mod release;

// Buffered capacity of the internal signal event queue. Anything ≥ 1
// guarantees that a signal arriving before the consumer is ready is not lost.
const QUEUE_CAPACITY: usize = 8;

/// Class of OS signal observed by the [`Signaler`].
///
/// No other signal kinds are subscribed to, so anything outside these three
/// classes never reaches a handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalClass {
    /// `SIGINT` on Unix; the `ctrl_c` action elsewhere.
    Interrupt,

    /// `SIGHUP` (Unix only).
    Hangup,

    /// `SIGTERM` (Unix only).
    Termination,
}

impl SignalClass {
    /// Human-readable name of this signal class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Hangup => "hangup",
            Self::Termination => "termination",
        }
    }
}

impl Display for SignalClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work bound to a signal class: invoked with the shared
/// [`Release`] gate, returning an error purely for observability.
pub type SignalHandler = Box<dyn Fn(&Release) -> Result<(), BoxError> + Send + Sync>;

/// Fault reported to the `on_error` callback of
/// [`wait_for_signal`](Signaler::wait_for_signal).
///
/// Handler faults are observability events, not control flow: dispatch
/// continues with the next handler in the chain and with future signals.
#[derive(Debug, Error)]
pub enum SignalerError {
    /// Failed to subscribe to OS delivery of one of the signal kinds.
    #[error("failed to subscribe to {class} signals")]
    Subscribe {
        /// The signal class whose subscription failed.
        class: SignalClass,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A handler returned an error during dispatch.
    #[error("a {class} handler failed during dispatch")]
    Handler {
        /// The signal class whose chain was being dispatched.
        class: SignalClass,
        /// The error returned by the handler.
        #[source]
        source: BoxError,
    },
}

/// Dispatches OS signals to ordered handler chains.
///
/// Three chains are kept, one per [`SignalClass`]. Handlers are registered
/// before dispatch begins, with insertion order preserved; the chains are
/// immutable once [`wait_for_signal`](Signaler::wait_for_signal) starts.
///
/// Every handler of every chain receives the same shared [`Release`] gate.
/// Triggering it is the only way to end the wait: there is no timeout and no
/// separate cancellation path at this layer.
///
/// ## Dispatch model
///
/// Intercepted signals are buffered into an internal event queue and consumed
/// by a single loop: signals run in arrival order, and within one signal's
/// chain the handlers run in registration order, synchronously. No two
/// handlers ever run concurrently, even for different signal classes. A
/// handler that never returns therefore blocks all subsequent dispatch,
/// including the ability to release.
///
/// ## Example
///
/// ```no_run
/// use gantry_core::Signaler;
///
/// #[tokio::main]
/// async fn main() {
///     let signaler = Signaler::new()
///         .on_hangup(|_release| {
///             tracing::info!("Configuration reload requested");
///             Ok(())
///         })
///         .on_termination(|release| {
///             release.release();
///             Ok(())
///         });
///
///     signaler
///         .wait_for_signal(|error| tracing::error!(%error, "Signal handler failed"))
///         .await;
/// }
/// ```
#[derive(Default)]
pub struct Signaler {
    on_interrupt: Vec<SignalHandler>,
    on_hangup: Vec<SignalHandler>,
    on_termination: Vec<SignalHandler>,
}

impl Signaler {
    /// Creates a [`Signaler`] with all three handler chains empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the **interrupt** chain.
    pub fn on_interrupt<H>(mut self, handler: H) -> Self
    where
        H: Fn(&Release) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_interrupt.push(Box::new(handler));

        self
    }

    /// Appends a handler to the **hangup** chain.
    pub fn on_hangup<H>(mut self, handler: H) -> Self
    where
        H: Fn(&Release) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_hangup.push(Box::new(handler));

        self
    }

    /// Appends a handler to the **termination** chain.
    pub fn on_termination<H>(mut self, handler: H) -> Self
    where
        H: Fn(&Release) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_termination.push(Box::new(handler));

        self
    }
}

impl Signaler {
    /// Subscribes to the OS signals and blocks (asynchronously) until some
    /// handler triggers the shared [`Release`].
    ///
    /// Handler errors are reported to `on_error` as they occur; they never
    /// abort the chain or the wait. If subscribing to a signal kind fails,
    /// the failure is reported to `on_error` and this method returns
    /// immediately rather than waiting for a release that could never come.
    ///
    /// Once released, the event queue is closed and drained: signals already
    /// intercepted still dispatch their chains before this method returns.
    pub async fn wait_for_signal(self, on_error: impl Fn(SignalerError)) {
        // Subscribe before consuming, so that a signal arriving before the
        // consumer is ready is buffered rather than lost
        let subscription = match SignalSubscription::subscribe() {
            Ok(subscription) => subscription,
            Err(error) => {
                on_error(error);
                return;
            }
        };

        let (queue_in, queue_out) = channel(QUEUE_CAPACITY);
        let release = Release::new();

        // Forward intercepted signals into the queue until released
        let forwarder = tokio::spawn(subscription.forward(queue_in, release.clone()));

        // Consume the queue on this task until the forwarder closes it
        self.consume(queue_out, &release, &on_error).await;

        // The forwarder has already exited at this point; reap it
        let _ = forwarder.await;

        info!("Signal wait released");
    }

    /// Dequeues signal events until the queue is closed and drained.
    async fn consume(
        &self,
        mut queue: Receiver<SignalClass>,
        release: &Release,
        on_error: &impl Fn(SignalerError),
    ) {
        while let Some(class) = queue.recv().await {
            self.dispatch(class, release, on_error);
        }
    }

    /// Runs the chain matching the given class: in registration order,
    /// synchronously, on the consuming task.
    fn dispatch(&self, class: SignalClass, release: &Release, on_error: &impl Fn(SignalerError)) {
        let chain = self.chain(class);

        info!(signal = %class, handlers = chain.len(), "Dispatching signal");

        for handler in chain {
            if let Err(source) = handler(release) {
                on_error(SignalerError::Handler { class, source });
            }
        }
    }

    /// Selects the handler chain for the given class.
    fn chain(&self, class: SignalClass) -> &[SignalHandler] {
        match class {
            SignalClass::Interrupt => &self.on_interrupt,
            SignalClass::Hangup => &self.on_hangup,
            SignalClass::Termination => &self.on_termination,
        }
    }
}

/// OS-side subscription to the three observed signal kinds on a Unix
/// platform.
#[cfg(unix)]
struct SignalSubscription {
    interrupt: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    termination: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalSubscription {
    /// Installs the OS signal handlers.
    fn subscribe() -> Result<Self, SignalerError> {
        use tokio::signal::unix::{SignalKind, signal};

        let subscribe_to = |kind: SignalKind, class: SignalClass| {
            signal(kind).map_err(|source| SignalerError::Subscribe { class, source })
        };

        Ok(Self {
            interrupt: subscribe_to(SignalKind::interrupt(), SignalClass::Interrupt)?,
            hangup: subscribe_to(SignalKind::hangup(), SignalClass::Hangup)?,
            termination: subscribe_to(SignalKind::terminate(), SignalClass::Termination)?,
        })
    }

    /// Forwards intercepted signals into the event queue until the release is
    /// triggered. Dropping the queue sender on the way out is what closes the
    /// queue and ends the consumer loop.
    async fn forward(mut self, queue: Sender<SignalClass>, release: Release) {
        loop {
            let class = tokio::select! {
                biased; // release always wins over pending signal delivery
                _ = release.released() => break,
                _ = self.interrupt.recv() => SignalClass::Interrupt,
                _ = self.hangup.recv() => SignalClass::Hangup,
                _ = self.termination.recv() => SignalClass::Termination,
            };

            // Post without blocking, mirroring how the OS delivers: an event
            // that does not fit into the buffer is dropped
            if queue.try_send(class).is_err() {
                warn!(signal = %class, "Signal event queue is full; dropping event");
            }
        }
    }
}

/// OS-side subscription on a non-Unix platform: only the `ctrl_c` action is
/// available, observed as [`SignalClass::Interrupt`].
#[cfg(not(unix))]
struct SignalSubscription;

#[cfg(not(unix))]
impl SignalSubscription {
    fn subscribe() -> Result<Self, SignalerError> {
        Ok(Self)
    }

    async fn forward(self, queue: Sender<SignalClass>, release: Release) {
        loop {
            tokio::select! {
                biased;
                _ = release.released() => break,
                outcome = tokio::signal::ctrl_c() => {
                    if outcome.is_err() {
                        warn!("Lost the ctrl_c subscription; closing the signal queue");
                        break;
                    }

                    if queue.try_send(SignalClass::Interrupt).is_err() {
                        warn!("Signal event queue is full; dropping event");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Feeds the given classes through the internal queue and runs the
    /// consumer loop to completion, collecting reported errors.
    async fn run_consumer(signaler: Signaler, classes: &[SignalClass]) -> Vec<SignalerError> {
        let (queue_in, queue_out) = channel(QUEUE_CAPACITY);
        for class in classes {
            queue_in.try_send(*class).unwrap();
        }
        drop(queue_in); // close the queue so the consumer drains and exits

        let errors = Mutex::new(Vec::new());
        let release = Release::new();

        signaler
            .consume(queue_out, &release, &|error| {
                errors.lock().unwrap().push(error)
            })
            .await;

        errors.into_inner().unwrap()
    }

    fn record(
        journal: Arc<Mutex<Vec<&'static str>>>,
        entry: &'static str,
    ) -> impl Fn(&Release) -> Result<(), BoxError> + Send + 'static {
        move |_release: &Release| {
            journal.lock().unwrap().push(entry);
            Ok(())
        }
    }

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        // Given
        let journal = Arc::new(Mutex::new(Vec::new()));
        let signaler = Signaler::new()
            .on_interrupt(record(journal.clone(), "first"))
            .on_interrupt(record(journal.clone(), "second"))
            .on_interrupt(record(journal.clone(), "third"));

        // When
        let errors = run_consumer(signaler, &[SignalClass::Interrupt]).await;

        // Then
        assert_eq!(*journal.lock().unwrap(), vec!["first", "second", "third"]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn failing_handler_does_not_stop_the_chain() {
        // Given
        let journal = Arc::new(Mutex::new(Vec::new()));
        let signaler = Signaler::new()
            .on_termination(record(journal.clone(), "h1"))
            .on_termination(|_release: &Release| Err("h2 exploded".into()))
            .on_termination(record(journal.clone(), "h3"));

        // When
        let errors = run_consumer(signaler, &[SignalClass::Termination]).await;

        // Then
        assert_eq!(*journal.lock().unwrap(), vec!["h1", "h3"]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SignalerError::Handler {
                class: SignalClass::Termination,
                ..
            }
        ));
        assert_eq!(
            errors[0].to_string(),
            "a termination handler failed during dispatch",
        );
    }

    #[tokio::test]
    async fn chains_are_routed_per_class() {
        // Given
        let journal = Arc::new(Mutex::new(Vec::new()));
        let signaler = Signaler::new()
            .on_interrupt(record(journal.clone(), "interrupt"))
            .on_hangup(record(journal.clone(), "hangup"))
            .on_termination(record(journal.clone(), "termination"));

        // When
        let errors = run_consumer(
            signaler,
            &[
                SignalClass::Hangup,
                SignalClass::Termination,
                SignalClass::Hangup,
            ],
        )
        .await;

        // Then: hangup and termination handlers never land in the interrupt
        // chain, and the interrupt chain never fires
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["hangup", "termination", "hangup"],
        );
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn signals_dispatch_in_arrival_order() {
        // Given
        let journal = Arc::new(Mutex::new(Vec::new()));
        let signaler = Signaler::new()
            .on_interrupt(record(journal.clone(), "interrupt"))
            .on_termination(record(journal.clone(), "termination"));

        // When
        let _ = run_consumer(
            signaler,
            &[
                SignalClass::Termination,
                SignalClass::Interrupt,
                SignalClass::Termination,
            ],
        )
        .await;

        // Then
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["termination", "interrupt", "termination"],
        );
    }

    #[tokio::test]
    async fn release_is_shared_across_chains() {
        // Given
        let released_seen = Arc::new(AtomicUsize::new(0));
        let released_seen_probe = released_seen.clone();

        let signaler = Signaler::new()
            .on_hangup(|release: &Release| {
                release.release();
                Ok(())
            })
            .on_termination(move |release: &Release| {
                if release.is_released() {
                    released_seen_probe.fetch_add(1, Ordering::SeqCst);
                }
                release.release(); // repeat release stays a no-op
                Ok(())
            });

        // When
        let errors = run_consumer(signaler, &[SignalClass::Hangup, SignalClass::Termination]).await;

        // Then
        assert_eq!(released_seen.load(Ordering::SeqCst), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn signal_class_names() {
        assert_eq!(SignalClass::Interrupt.to_string(), "interrupt");
        assert_eq!(SignalClass::Hangup.to_string(), "hangup");
        assert_eq!(SignalClass::Termination.to_string(), "termination");
    }
}
