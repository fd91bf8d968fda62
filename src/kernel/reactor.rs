use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::change::ChangeDetector;
use super::event::{CompletionDelivery, RequestId};
use super::telemetry::event::{OutcomeKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Tick;

use crate::composer::prompt::PayloadComposer;
use crate::config::{NarratorConfig, DELIVERY_CHANNEL_CAPACITY};
use crate::outputs::text::ResultSink;
use crate::services::llm::client::{ClientError, CompletionClient};
use crate::services::llm::extract::extract;
use crate::world::snapshot::SnapshotBuilder;
use crate::world::source::EntitySource;

/// What to do with a completion that arrives after a newer request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Drop it. The sink only ever shows the answer to the newest request.
    #[default]
    DiscardSuperseded,
    /// Write every completion in arrival order.
    ApplyAll,
}

impl FromStr for StalePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discard" => Ok(StalePolicy::DiscardSuperseded),
            "apply" => Ok(StalePolicy::ApplyAll),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub changed: bool,
    pub dispatched: Option<RequestId>,
}

/// Owns all cross-tick state. Ticks run on `&mut self`, so there is a
/// single writer for `detector` by construction.
pub struct Reactor {
    pub receiver: mpsc::Receiver<CompletionDelivery>,
    client: CompletionClient,
    builder: SnapshotBuilder,
    composer: Box<dyn PayloadComposer>,
    sink: Box<dyn ResultSink>,
    pub detector: ChangeDetector,
    pub tick: Tick,
    pub stale_policy: StalePolicy,
    next_seq: u64,
    latest_dispatched: Option<RequestId>,
    in_flight: usize,
    pub telemetry: TelemetryRecorder,
}

impl Reactor {
    pub fn new(config: &NarratorConfig, sink: Box<dyn ResultSink>) -> Result<Self, ClientError> {
        let (tx, rx) = mpsc::channel(DELIVERY_CHANNEL_CAPACITY);
        let client = CompletionClient::new(config.endpoint.clone(), config.request_timeout, tx)?;

        Ok(Self {
            receiver: rx,
            client,
            builder: SnapshotBuilder::new(),
            composer: Box::new(config.prompt()),
            sink,
            detector: ChangeDetector::new(),
            tick: Tick::new(),
            stale_policy: config.stale_policy,
            next_seq: 0,
            latest_dispatched: None,
            in_flight: 0,
            telemetry: TelemetryRecorder::new(),
        })
    }

    pub fn with_composer(mut self, composer: Box<dyn PayloadComposer>) -> Self {
        self.composer = composer;
        self
    }

    pub fn latest_dispatched(&self) -> Option<RequestId> {
        self.latest_dispatched
    }

    /// Requests sent whose delivery has not been received yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Explicit replacement for the widget's construct hook: the first tick.
    /// Same runtime requirement as [`Reactor::tick_step`].
    pub fn initialize(&mut self, source: &dyn EntitySource) -> TickReport {
        info!("Narrator initializing against {}", self.client.endpoint());
        self.tick_step(source)
    }

    /// One observation cycle: snapshot -> canonical text -> diff -> maybe push.
    /// Returns once the request is handed to the transport, not when it lands.
    ///
    /// The stored canonical text is replaced on every tick, changed or not.
    ///
    /// A changed tick spawns the request with `tokio::spawn`, so this must run
    /// inside a tokio runtime. Calling it from plain sync code panics.
    pub fn tick_step(&mut self, source: &dyn EntitySource) -> TickReport {
        self.tick = self.tick.next();

        let snapshot = self.builder.build(source);
        let text = snapshot.canonical_text();
        let changed = self.detector.observe(text);

        self.telemetry.record(TelemetryEvent::TickObserved {
            tick: self.tick,
            changed,
            entity_count: snapshot.entity_count(),
        });

        if !changed {
            debug!("Tick {}: world unchanged, no push", self.tick.frame);
            return TickReport { tick: self.tick, changed, dispatched: None };
        }

        let request = self.composer.compose(&snapshot);
        let id = RequestId { seq: self.next_seq, tick: self.tick };
        self.next_seq += 1;

        info!("Tick {}: world changed, dispatching request {}", self.tick.frame, id.seq);
        // Detached: the delivery channel is the only completion path
        let _ = self.client.send_async(id, request);

        self.latest_dispatched = Some(id);
        self.in_flight += 1;
        self.telemetry.record(TelemetryEvent::RequestDispatched { request: id });

        TickReport { tick: self.tick, changed, dispatched: Some(id) }
    }

    /// Extract and write one completion to the sink, unless it is stale.
    /// Returns true if the sink was written.
    pub fn apply_completion(&mut self, delivery: CompletionDelivery) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.stale_policy == StalePolicy::DiscardSuperseded {
            if let Some(latest) = self.latest_dispatched {
                if delivery.request.seq < latest.seq {
                    info!("Discarded stale completion {:?} (newest is {:?})", delivery.request, latest);
                    self.telemetry.record(TelemetryEvent::ResponseDiscarded {
                        request: delivery.request,
                        superseded_by: latest,
                    });
                    return false;
                }
            }
        }

        let outcome = extract(&delivery);
        self.telemetry.record(TelemetryEvent::ResponseApplied {
            request: delivery.request,
            outcome: OutcomeKind::from(&outcome),
            latency_ticks: self.tick.frame.saturating_sub(delivery.request.tick.frame),
        });

        if !outcome.is_extracted() {
            info!("Fallback: displaying failure message for {:?}", delivery.request);
        }
        self.sink.set_text(&outcome.into_message());
        true
    }

    /// Applies everything already delivered without waiting. Returns how many
    /// completions reached the sink.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.receiver.try_recv() {
            if self.apply_completion(delivery) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next delivery and applies it. Returns whether the sink was written.
    pub async fn apply_next(&mut self) -> Option<bool> {
        let delivery = self.receiver.recv().await?;
        Some(self.apply_completion(delivery))
    }

    /// Async driver loop. Ticks once immediately, then every `period` if set,
    /// applying completions as they arrive until `shutdown` resolves.
    pub async fn run<F>(&mut self, source: &dyn EntitySource, period: Option<Duration>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.initialize(source);

        let mut cadence = period.map(|period| {
            let mut cadence = interval(period);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
            cadence
        });
        // The first interval tick fires immediately; initialize already covered it
        if let Some(cadence) = cadence.as_mut() {
            cadence.tick().await;
        }

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Narrator shutting down after {} ticks", self.tick.frame);
                    break;
                }
                Some(delivery) = self.receiver.recv() => {
                    self.apply_completion(delivery);
                }
                _ = next_tick(&mut cadence) => {
                    self.tick_step(source);
                }
            }
        }
    }
}

async fn next_tick(cadence: &mut Option<Interval>) {
    match cadence {
        Some(cadence) => {
            cadence.tick().await;
        }
        None => std::future::pending().await,
    }
}
