//! Per-request lifecycle: `received → validated → rendering → (converting)
//! → ready | failed`. Only logged; never exposed to the client.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Instant;

use strum_macros::AsRefStr;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RequestStage {
    Received,
    Validated,
    Rendering,
    Converting,
    Ready,
    Failed,
}

impl RequestStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStage::Ready | RequestStage::Failed)
    }

    /// Whether `next` may follow `self`. Any live stage may fail.
    pub fn can_advance_to(self, next: RequestStage) -> bool {
        use RequestStage::*;
        match (self, next) {
            (Ready | Failed, _) => false,
            (_, Failed) => true,
            (Received, Validated) => true,
            (Validated, Rendering) => true,
            (Rendering, Converting | Ready) => true,
            (Converting, Ready) => true,
            _ => false,
        }
    }
}

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

/// Tracks one request through its stages and logs each transition.
#[derive(Debug)]
pub struct RequestTrace {
    id: u64,
    operation: &'static str,
    stage: RequestStage,
    started: Instant,
}

impl RequestTrace {
    pub fn start(operation: &'static str) -> Self {
        let id = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(request = id, operation, stage = %RequestStage::Received, "document request");
        Self {
            id,
            operation,
            stage: RequestStage::Received,
            started: Instant::now(),
        }
    }

    pub fn stage(&self) -> RequestStage {
        self.stage
    }

    pub fn advance(&mut self, next: RequestStage) {
        if !self.stage.can_advance_to(next) {
            tracing::warn!(request = self.id, from = %self.stage, to = %next, "unexpected stage transition");
        }
        self.stage = next;
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match next {
            RequestStage::Ready => {
                tracing::info!(request = self.id, operation = self.operation, elapsed_ms, "document ready");
            }
            RequestStage::Failed => {}
            _ => tracing::debug!(request = self.id, operation = self.operation, stage = %next, "document request"),
        }
    }

    pub fn fail(&mut self, reason: &dyn std::fmt::Display) {
        self.advance(RequestStage::Failed);
        tracing::warn!(
            request = self.id,
            operation = self.operation,
            error = %reason,
            "document request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut trace = RequestTrace::start("test");
        for stage in [
            RequestStage::Validated,
            RequestStage::Rendering,
            RequestStage::Converting,
            RequestStage::Ready,
        ] {
            assert!(trace.stage().can_advance_to(stage), "{} -> {stage}", trace.stage());
            trace.advance(stage);
        }
        assert!(trace.stage().is_terminal());
    }

    #[test]
    fn terminal_stages_are_final() {
        assert!(!RequestStage::Ready.can_advance_to(RequestStage::Failed));
        assert!(!RequestStage::Failed.can_advance_to(RequestStage::Rendering));
        assert!(!RequestStage::Received.can_advance_to(RequestStage::Rendering));
        assert!(RequestStage::Rendering.can_advance_to(RequestStage::Ready));
    }

    #[test]
    fn stage_names() {
        assert_eq!(RequestStage::Converting.to_string(), "converting");
    }
}
