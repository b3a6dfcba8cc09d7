//! Single-flight request state machine.
//!
//! `Idle → Pending → {Succeeded, Failed}`, with a new submission resetting
//! to `Pending`. At most one request is in flight at a time: `begin` while
//! `Pending` is a no-op. Completions carry the generation token handed out
//! by `begin`, so a stale response arriving after a reset or a newer
//! submission is discarded instead of overwriting current state.

use veridex_common::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Pending,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

#[derive(Debug)]
pub struct RequestTracker {
    state: RequestState,
    /// Monotonically increasing; never reset, so tokens from abandoned
    /// requests can never match again.
    generation: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self { state: RequestState::Idle, generation: 0 }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::Pending)
    }

    /// Start a request. Returns the generation token to pass back to
    /// `complete`, or `None` when a request is already in flight (the
    /// submit affordance should be disabled, but rapid repeated triggers
    /// must not dispatch twice either way).
    pub fn begin(&mut self) -> Option<u64> {
        if self.is_pending() {
            return None;
        }
        self.generation += 1;
        self.state = RequestState::Pending;
        Some(self.generation)
    }

    /// Resolve the in-flight request. Returns `false` when the completion
    /// is stale (older generation, or the tracker was reset meanwhile) and
    /// was discarded. Terminal states fully replace the previous one.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if generation != self.generation || !self.is_pending() {
            return false;
        }
        self.state = match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(err) => RequestState::Failed(err),
        };
        true
    }

    /// Return to `Idle` without touching the generation counter — any
    /// response still in flight becomes stale.
    pub fn reset(&mut self) {
        self.state = RequestState::Idle;
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use veridex_common::{AnalysisError, AnalysisResult, ErrorKind, Verdict};

    use super::*;

    fn ok_result(confidence: f64) -> AnalysisResult {
        AnalysisResult::new(Verdict::Real, confidence, "reasoning")
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut tracker = RequestTracker::new();
        assert_eq!(*tracker.state(), RequestState::Idle);

        let generation = tracker.begin().unwrap();
        assert!(tracker.is_pending());

        assert!(tracker.complete(generation, Ok(ok_result(0.9))));
        assert_eq!(*tracker.state(), RequestState::Succeeded(ok_result(0.9)));
    }

    #[test]
    fn test_begin_while_pending_is_a_no_op() {
        let mut tracker = RequestTracker::new();
        let first = tracker.begin().unwrap();
        assert_eq!(tracker.begin(), None);
        // The original request still completes normally
        assert!(tracker.complete(first, Ok(ok_result(0.5))));
    }

    #[test]
    fn test_stale_completion_is_discarded_after_resubmission() {
        let mut tracker = RequestTracker::new();
        let first = tracker.begin().unwrap();
        assert!(tracker.complete(first, Err(AnalysisError::new(ErrorKind::TimeoutError, "t"))));

        let second = tracker.begin().unwrap();
        // The first request's response arrives late
        assert!(!tracker.complete(first, Ok(ok_result(0.1))));
        assert!(tracker.is_pending());

        assert!(tracker.complete(second, Ok(ok_result(0.8))));
        assert_eq!(*tracker.state(), RequestState::Succeeded(ok_result(0.8)));
    }

    #[test]
    fn test_completion_after_reset_is_discarded() {
        let mut tracker = RequestTracker::new();
        let generation = tracker.begin().unwrap();
        tracker.reset();

        assert!(!tracker.complete(generation, Ok(ok_result(0.7))));
        assert_eq!(*tracker.state(), RequestState::Idle);
    }

    #[test]
    fn test_terminal_states_are_fully_replaced() {
        let mut tracker = RequestTracker::new();
        let g1 = tracker.begin().unwrap();
        tracker.complete(g1, Ok(ok_result(0.9)));

        let g2 = tracker.begin().unwrap();
        tracker.complete(g2, Err(AnalysisError::new(ErrorKind::QuotaError, "limit")));
        match tracker.state() {
            RequestState::Failed(err) => assert_eq!(err.kind, ErrorKind::QuotaError),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
