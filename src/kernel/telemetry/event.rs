use crate::kernel::event::RequestId;
use crate::kernel::time::Tick;
use crate::services::llm::extract::ExtractOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    TickObserved {
        tick: Tick,
        changed: bool,
        entity_count: usize,
    },

    RequestDispatched {
        request: RequestId,
    },

    ResponseApplied {
        request: RequestId,
        outcome: OutcomeKind,
        // Ticks elapsed between dispatch and application
        latency_ticks: u64,
    },

    ResponseDiscarded {
        request: RequestId,
        superseded_by: RequestId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    TransportError,
    ParseError,
    MissingChoices,
    MalformedChoice,
    Extracted,
}

impl From<&ExtractOutcome> for OutcomeKind {
    fn from(outcome: &ExtractOutcome) -> Self {
        match outcome {
            ExtractOutcome::TransportError => OutcomeKind::TransportError,
            ExtractOutcome::ParseError => OutcomeKind::ParseError,
            ExtractOutcome::MissingChoices => OutcomeKind::MissingChoices,
            ExtractOutcome::MalformedChoice => OutcomeKind::MalformedChoice,
            ExtractOutcome::Extracted(_) => OutcomeKind::Extracted, // Content STRIPPED
        }
    }
}
