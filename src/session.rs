//! # Session Controller
//!
//! Drives one encoded job over a transport, segment by segment, with
//! bounded retry and cooperative cancellation.
//!
//! ## Delivery Model
//!
//! The unit of transmission is one decoded segment span. Retries always
//! resend the exact bytes of the failed segment, never a re-encoded
//! variant, so the stream the printer sees is a prefix of the planned job
//! plus whole-segment repeats.
//!
//! After a heavy segment (a raw data block, or a raster command at or above
//! the ack threshold) the controller waits for the printer to answer before
//! moving on. Flow control on `usblp` is crude: any received byte counts as
//! the device keeping up, and silence counts as a transient failure.
//!
//! ## Cancellation
//!
//! Cancellation is a shared flag checked between segments. An in-flight
//! write is never torn; the job stops at the next segment boundary and the
//! port is closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::catalog::Opcode;
use crate::protocol::decode::{CommandSequence, Segment};
use crate::transport::{TransportError, TransportPort};

// ============================================================================
// ERRORS
// ============================================================================

/// A job that could not be delivered in full.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A segment failed past the retry budget (or permanently).
    ///
    /// `segments_sent` counts fully delivered segments, so resumption
    /// tooling knows the exact prefix the printer received.
    #[error("Transport failed at segment {segments_sent}/{segments_total}: {source}")]
    Transport {
        segments_sent: usize,
        segments_total: usize,
        source: TransportError,
    },

    /// The cancel flag was raised between segments.
    #[error("Session cancelled after {segments_sent} segments")]
    Cancelled { segments_sent: usize },
}

// ============================================================================
// RETRY POLICY
// ============================================================================

/// Retry and flow-control knobs for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries per segment beyond the first attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles each further retry.
    pub initial_backoff: Duration,
    /// How long to wait for the printer after a heavy segment.
    pub ack_timeout: Duration,
    /// Command segments at or above this many wire bytes get an ack wait.
    /// Raw data blocks always do.
    pub ack_threshold: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(50),
            ack_timeout: Duration::from_millis(2000),
            ack_threshold: 4096,
        }
    }
}

impl RetryPolicy {
    /// A policy with no sleeps, for tests.
    pub fn immediate() -> Self {
        Self {
            initial_backoff: Duration::ZERO,
            ack_timeout: Duration::ZERO,
            ..Self::default()
        }
    }
}

// ============================================================================
// SESSION REPORT
// ============================================================================

/// Outcome of a fully delivered job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub segments_sent: usize,
    pub bytes_sent: usize,
    /// Total retry attempts across all segments.
    pub retries: u32,
}

// ============================================================================
// SESSION CONTROLLER
// ============================================================================

/// Owns a transport for the duration of one or more jobs.
pub struct SessionController<T: TransportPort> {
    transport: T,
    policy: RetryPolicy,
    cancel: Arc<AtomicBool>,
}

impl<T: TransportPort> SessionController<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A flag that aborts the session at the next segment boundary when set.
    /// Safe to hand to a signal handler or another thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver `bytes` segment by segment per `sequence`.
    ///
    /// The sequence's spans must cover `bytes` (which [`crate::driver::encode`]
    /// guarantees for its output). The port is closed on every exit path,
    /// success or not.
    pub fn run(
        &mut self,
        bytes: &[u8],
        sequence: &CommandSequence,
    ) -> Result<SessionReport, SessionError> {
        let result = self.deliver(bytes, sequence);
        // Best effort: the primary outcome wins over a close failure.
        let _ = self.transport.close();
        result
    }

    fn deliver(
        &mut self,
        bytes: &[u8],
        sequence: &CommandSequence,
    ) -> Result<SessionReport, SessionError> {
        let segments_total = sequence.len();
        let mut report = SessionReport {
            segments_sent: 0,
            bytes_sent: 0,
            retries: 0,
        };

        for segment in sequence.iter() {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(SessionError::Cancelled {
                    segments_sent: report.segments_sent,
                });
            }

            let span = segment.span();
            let payload = span.slice(bytes);
            let wants_ack = needs_ack(segment, &self.policy);

            self.send_segment(payload, wants_ack, &mut report.retries)
                .map_err(|source| SessionError::Transport {
                    segments_sent: report.segments_sent,
                    segments_total,
                    source,
                })?;

            report.segments_sent += 1;
            report.bytes_sent += span.len;
        }

        Ok(report)
    }

    /// Send one segment, retrying transient failures with doubling backoff.
    fn send_segment(
        &mut self,
        payload: &[u8],
        wants_ack: bool,
        retries: &mut u32,
    ) -> Result<(), TransportError> {
        let mut backoff = self.policy.initial_backoff;
        let mut attempts_left = self.policy.max_retries;

        loop {
            let outcome = self.transport.send(payload).and_then(|()| {
                if wants_ack {
                    // Any answer at all means the device is keeping up.
                    self.transport.receive(self.policy.ack_timeout).map(|_| ())
                } else {
                    Ok(())
                }
            });

            match outcome {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempts_left > 0 => {
                    attempts_left -= 1;
                    *retries += 1;
                    if !backoff.is_zero() {
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Whether a segment gets a post-send ack wait.
fn needs_ack(segment: &Segment, policy: &RetryPolicy) -> bool {
    match segment {
        Segment::Data(_) => true,
        Segment::Command(c) => {
            c.opcode == Opcode::BitImage && c.span.len >= policy.ack_threshold
        }
        Segment::Unknown(_) => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::InkChannel;
    use crate::driver::{encode, PrintIntent};
    use crate::printer::config::PrinterConfig;
    use crate::printer::state::PrinterState;
    use crate::transport::MockTransport;

    fn small_job() -> crate::driver::EncodedJob {
        let intent = PrintIntent {
            resolution: 720,
            channels: vec![InkChannel::Black],
            white_ink: false,
            underbase_level: 0,
            width_dots: 16,
            raster: vec![0xAA; 64],
        };
        encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap()
    }

    #[test]
    fn test_happy_path_delivers_every_byte_in_order() {
        let job = small_job();
        let mut session = SessionController::new(MockTransport::new(), RetryPolicy::immediate());
        let report = session.run(&job.bytes, &job.sequence).unwrap();

        assert_eq!(report.segments_sent, job.sequence.len());
        assert_eq!(report.bytes_sent, job.bytes.len());
        assert_eq!(report.retries, 0);
        assert_eq!(session.transport.delivered(), job.bytes);
        assert!(session.transport.closed);
    }

    #[test]
    fn test_transient_twice_then_success() {
        let job = small_job();
        let mut port = MockTransport::new();
        port.script_transient_failures(2);
        let mut session = SessionController::new(port, RetryPolicy::immediate());

        let report = session.run(&job.bytes, &job.sequence).unwrap();
        assert_eq!(report.retries, 2);
        // First segment took 3 attempts, the rest one each.
        assert_eq!(session.transport.send_calls, job.sequence.len() + 2);
        // Retries resend the same bytes, so delivery is still exact.
        assert_eq!(session.transport.delivered(), job.bytes);
    }

    #[test]
    fn test_retry_budget_exhausted() {
        let job = small_job();
        let mut port = MockTransport::new();
        port.script_transient_failures(4); // budget is 3 retries
        let mut session = SessionController::new(port, RetryPolicy::immediate());

        let err = session.run(&job.bytes, &job.sequence).unwrap_err();
        assert_eq!(
            err,
            SessionError::Transport {
                segments_sent: 0,
                segments_total: job.sequence.len(),
                source: TransportError::Timeout,
            }
        );
        assert!(session.transport.closed);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let job = small_job();
        let mut port = MockTransport::new();
        port.script_send(Ok(()));
        port.script_send(Err(TransportError::Disconnected));
        let mut session = SessionController::new(port, RetryPolicy::immediate());

        let err = session.run(&job.bytes, &job.sequence).unwrap_err();
        assert_eq!(
            err,
            SessionError::Transport {
                segments_sent: 1,
                segments_total: job.sequence.len(),
                source: TransportError::Disconnected,
            }
        );
        assert_eq!(session.transport.send_calls, 2);
    }

    #[test]
    fn test_cancel_before_start_sends_nothing() {
        let job = small_job();
        let mut session = SessionController::new(MockTransport::new(), RetryPolicy::immediate());
        session.cancel_handle().store(true, Ordering::Relaxed);

        let err = session.run(&job.bytes, &job.sequence).unwrap_err();
        assert_eq!(err, SessionError::Cancelled { segments_sent: 0 });
        assert_eq!(session.transport.send_calls, 0);
        assert!(session.transport.closed);
    }

    #[test]
    fn test_heavy_raster_waits_for_ack() {
        // 3000 rows of 2 bytes: one BitImage well above the 4 KiB threshold.
        let intent = PrintIntent {
            resolution: 720,
            channels: vec![InkChannel::Black],
            white_ink: false,
            underbase_level: 0,
            width_dots: 16,
            raster: vec![0xFF; 6000],
        };
        let job = encode(&intent, PrinterState::new(), &PrinterConfig::F2100).unwrap();

        let mut port = MockTransport::new();
        port.script_response(vec![0x06]);
        let mut session = SessionController::new(port, RetryPolicy::immediate());
        session.run(&job.bytes, &job.sequence).unwrap();
        assert_eq!(session.transport.receive_calls, 1);
    }

    #[test]
    fn test_light_job_never_waits() {
        let job = small_job(); // raster far below the ack threshold
        let mut session = SessionController::new(MockTransport::new(), RetryPolicy::immediate());
        session.run(&job.bytes, &job.sequence).unwrap();
        assert_eq!(session.transport.receive_calls, 0);
    }
}
