use std::collections::VecDeque;
use super::event::{OutcomeKind, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub tick_stats: TickStats,
    pub request_stats: RequestStats,
    pub outcome_stats: OutcomeStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub total: u64,
    pub changed: u64,
    pub unchanged: u64,
    pub max_entities: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStats {
    pub dispatched: u64,
    pub applied: u64,
    pub discarded: u64,
    pub avg_latency_ticks: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeStats {
    pub extracted: u64,
    pub transport_errors: u64,
    pub parse_errors: u64,
    pub missing_choices: u64,
    pub malformed_choices: u64,
}

impl OutcomeStats {
    pub fn fallbacks(&self) -> u64 {
        self.transport_errors + self.parse_errors + self.missing_choices + self.malformed_choices
    }
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_latency = 0u64;

    for event in events {
        match event {
            TelemetryEvent::TickObserved { changed, entity_count, .. } => {
                snap.tick_stats.total += 1;
                if *changed {
                    snap.tick_stats.changed += 1;
                } else {
                    snap.tick_stats.unchanged += 1;
                }
                snap.tick_stats.max_entities = snap.tick_stats.max_entities.max(*entity_count);
            }
            TelemetryEvent::RequestDispatched { .. } => {
                snap.request_stats.dispatched += 1;
            }
            TelemetryEvent::ResponseApplied { outcome, latency_ticks, .. } => {
                snap.request_stats.applied += 1;
                total_latency += latency_ticks;
                match outcome {
                    OutcomeKind::Extracted => snap.outcome_stats.extracted += 1,
                    OutcomeKind::TransportError => snap.outcome_stats.transport_errors += 1,
                    OutcomeKind::ParseError => snap.outcome_stats.parse_errors += 1,
                    OutcomeKind::MissingChoices => snap.outcome_stats.missing_choices += 1,
                    OutcomeKind::MalformedChoice => snap.outcome_stats.malformed_choices += 1,
                }
            }
            TelemetryEvent::ResponseDiscarded { .. } => {
                snap.request_stats.discarded += 1;
            }
        }
    }

    if snap.request_stats.applied > 0 {
        snap.request_stats.avg_latency_ticks =
            total_latency as f64 / snap.request_stats.applied as f64;
    }

    snap
}
