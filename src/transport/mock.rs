//! # Mock Transport
//!
//! An in-memory [`TransportPort`] with scripted outcomes, used by the
//! session controller tests to exercise retry, backoff, and abort paths
//! without hardware.

use std::collections::VecDeque;
use std::time::Duration;

use super::{TransportError, TransportPort};

/// Scripted result for one `send` call.
pub type SendOutcome = Result<(), TransportError>;

/// A transport that replays scripted outcomes and records traffic.
///
/// Sends consume the script front-to-back; once the script is exhausted,
/// every send succeeds. Receives consume a separate response queue and time
/// out when it is empty.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: VecDeque<SendOutcome>,
    responses: VecDeque<Vec<u8>>,
    /// Every buffer passed to `send`, including failed attempts.
    pub sent: Vec<Vec<u8>>,
    pub send_calls: usize,
    pub receive_calls: usize,
    pub closed: bool,
}

impl MockTransport {
    /// A transport where everything succeeds and reads time out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next unscripted `send`.
    pub fn script_send(&mut self, outcome: SendOutcome) -> &mut Self {
        self.script.push_back(outcome);
        self
    }

    /// Queue `n` transient failures.
    pub fn script_transient_failures(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.script.push_back(Err(TransportError::Timeout));
        }
        self
    }

    /// Queue a response for the next `receive`.
    pub fn script_response(&mut self, data: Vec<u8>) -> &mut Self {
        self.responses.push_back(data);
        self
    }

    /// All successfully delivered bytes, concatenated in order.
    pub fn delivered(&self) -> Vec<u8> {
        self.sent.concat()
    }
}

impl TransportPort for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Disconnected);
        }
        self.send_calls += 1;
        match self.script.pop_front() {
            Some(Err(e)) => Err(e),
            _ => {
                self.sent.push(data.to_vec());
                Ok(())
            }
        }
    }

    fn receive(&mut self, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::Disconnected);
        }
        self.receive_calls += 1;
        self.responses.pop_front().ok_or(TransportError::Timeout)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
