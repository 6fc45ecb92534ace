//! Per-message and per-cycle outcomes of the polling loop.

/// Why a message was left on the queue for redelivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnackReason {
    /// The body did not decode through both envelope layers.
    Malformed(String),
    /// A record handler failed.
    HandlerFailed { object_key: String, reason: String },
    /// Shutdown was requested before the message was processed.
    ShuttingDown,
}

impl UnackReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::HandlerFailed { .. } => "handler_failed",
            Self::ShuttingDown => "shutdown",
        }
    }
}

/// What happened to one received message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Every record processed and the delete succeeded.
    Acknowledged { records: usize },
    /// Every record processed; the delete reported a stale handle or a
    /// missing queue, meaning the delivery was already superseded.
    AlreadyAcknowledged { records: usize },
    /// Not deleted; the message will be redelivered after its visibility
    /// timeout.
    Unacknowledged(UnackReason),
    /// Every record processed but the delete failed for another reason.
    AckFailed(String),
}

impl MessageOutcome {
    /// Whether the message will come back.
    pub fn will_redeliver(&self) -> bool {
        matches!(self, Self::Unacknowledged(_) | Self::AckFailed(_))
    }
}

/// Result of one polling cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// `(message_id, outcome)` in receive order.
    pub outcomes: Vec<(String, MessageOutcome)>,
}

impl CycleReport {
    /// Report for a poll that returned nothing.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Whether the poll returned no messages.
    pub fn is_idle(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Messages received in this cycle.
    pub fn received(&self) -> usize {
        self.outcomes.len()
    }

    /// Messages deleted in this cycle.
    pub fn acknowledged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, MessageOutcome::Acknowledged { .. }))
            .count()
    }

    /// Messages left for redelivery in this cycle.
    pub fn redelivering(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.will_redeliver()).count()
    }

    pub(crate) fn push(&mut self, message_id: String, outcome: MessageOutcome) {
        self.outcomes.push((message_id, outcome));
    }
}

/// Totals accumulated by a worker run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub idle_cycles: u64,
    pub failed_cycles: u64,
    pub acknowledged: u64,
    pub redelivering: u64,
}

impl RunSummary {
    pub(crate) fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if report.is_idle() {
            self.idle_cycles += 1;
        }
        self.acknowledged += report.acknowledged() as u64;
        self.redelivering += report.redelivering() as u64;
    }

    pub(crate) fn absorb_failure(&mut self) {
        self.cycles += 1;
        self.failed_cycles += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = CycleReport::idle();
        assert!(report.is_idle());
        report.push("a".into(), MessageOutcome::Acknowledged { records: 2 });
        report.push(
            "b".into(),
            MessageOutcome::Unacknowledged(UnackReason::Malformed("bad".into())),
        );
        report.push("c".into(), MessageOutcome::AlreadyAcknowledged { records: 1 });
        assert_eq!(report.received(), 3);
        assert_eq!(report.acknowledged(), 1);
        assert_eq!(report.redelivering(), 1);

        let mut summary = RunSummary::default();
        summary.absorb(&report);
        summary.absorb(&CycleReport::idle());
        summary.absorb_failure();
        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.idle_cycles, 1);
        assert_eq!(summary.failed_cycles, 1);
        assert_eq!(summary.acknowledged, 1);
    }
}
