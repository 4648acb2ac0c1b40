//! Ready-made health checks.
//!
//! Every function here produces a check closure suitable for
//! [`HealthProbes::with_liveness_check`](crate::HealthProbes::with_liveness_check)
//! and
//! [`HealthProbes::with_readiness_check`](crate::HealthProbes::with_readiness_check);
//! the check receives its name at registration.

use gantry_core::BoxError;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum CheckError {
    #[error("hostname resolution timed out")]
    ResolveTimeout,

    #[error("hostname did not resolve to any address")]
    Unresolved,
}

/// Creates a check that passes while the given `host` resolves through the
/// system resolver within the `timeout`.
///
/// The standard resolver offers no deadline of its own, so resolution runs on
/// a short-lived thread that is abandoned when the timeout strikes.
pub fn dns_resolve(
    host: impl Into<String>,
    timeout: Duration,
) -> impl Fn() -> Result<(), BoxError> + Send + Sync + 'static {
    let host = host.into();

    move || {
        let (sender, receiver) = mpsc::channel();
        let host = host.clone();

        std::thread::spawn(move || {
            let outcome = (host.as_str(), 0u16)
                .to_socket_addrs()
                .map_err(BoxError::from)
                .and_then(|mut addrs| match addrs.next() {
                    Some(_) => Ok(()),
                    None => Err(CheckError::Unresolved.into()),
                });

            let _ = sender.send(outcome);
        });

        receiver
            .recv_timeout(timeout)
            .unwrap_or_else(|_| Err(CheckError::ResolveTimeout.into()))
    }
}

/// Creates a check that passes while a TCP connection to the given `addr`
/// (a `host:port` pair) can be established within the `timeout`.
pub fn tcp_dial(
    addr: impl Into<String>,
    timeout: Duration,
) -> impl Fn() -> Result<(), BoxError> + Send + Sync + 'static {
    let addr = addr.into();

    move || {
        let target = addr
            .to_socket_addrs()?
            .next()
            .ok_or(CheckError::Unresolved)?;

        TcpStream::connect_timeout(&target, timeout)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn dns_resolve_passes_for_known_host() {
        // Given
        let check = dns_resolve("localhost", Duration::from_secs(5));

        // Then
        assert!(check().is_ok());
    }

    #[test]
    fn dns_resolve_fails_for_unknown_host() {
        // Given: the `.invalid` TLD is reserved and never resolves
        let check = dns_resolve("host.invalid", Duration::from_secs(5));

        // Then
        assert!(check().is_err());
    }

    #[test]
    fn tcp_dial_passes_for_listening_socket() {
        // Given
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let check = tcp_dial(addr.to_string(), Duration::from_secs(1));

        // Then
        assert!(check().is_ok());
    }

    #[test]
    fn tcp_dial_fails_for_closed_socket() {
        // Given: bind to learn a free port, then release it
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let check = tcp_dial(addr.to_string(), Duration::from_secs(1));

        // Then
        assert!(check().is_err());
    }
}
