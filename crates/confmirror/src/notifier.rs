//! Best-effort reload notification.
//!
//! After a pass, the downstream service is told to re-read its
//! configuration with a bodyless POST (Prometheus' `/-/reload` contract).
//! The response body is discarded; only the status code is interesting,
//! and only for logging. Failures are never retried and never reach the
//! coordinator: a broken endpoint must not stop files from being mirrored.

use tracing::{debug, error, warn};

/// Issues the downstream reload request after a reprocessing pass.
pub struct ReloadNotifier {
    /// Endpoint the reload POST is sent to.
    endpoint: String,
    /// Reused agent so repeated passes share connections.
    agent: ureq::Agent,
}

impl ReloadNotifier {
    /// Create a notifier for the given reload endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::agent(),
        }
    }

    /// POST the reload request, logging the outcome.
    ///
    /// Best effort by design: transport errors and HTTP error statuses are
    /// logged and swallowed, and nothing is retried.
    pub fn notify(&self) {
        debug!(endpoint = %self.endpoint, "posting reload command");

        match self.agent.post(&self.endpoint).call() {
            Ok(response) => {
                debug!(status = response.status(), "reload command accepted");
            }
            Err(ureq::Error::Status(code, _)) => {
                warn!(status = code, "reload endpoint returned error status");
            }
            Err(e) => {
                error!(error = %e, "error posting reload command");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_endpoint_does_not_panic() {
        // Grab a free port, then release it so the connection is refused.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let notifier = ReloadNotifier::new(format!("http://127.0.0.1:{port}/-/reload"));
        notifier.notify();
    }

    #[test]
    fn test_error_status_is_swallowed() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n");
        });

        let notifier = ReloadNotifier::new(format!("http://{addr}/-/reload"));
        notifier.notify();

        server.join().unwrap();
    }
}
