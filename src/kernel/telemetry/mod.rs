//! Pipeline telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (change detection,
//! dispatch, or stale rejection). It exists for observability and tests.
//!
//! # PRIVACY INVARIANT
//! Events carry ids, ticks and outcome kinds only. Never prompts,
//! response bodies, or world content.

pub mod event;
pub mod metrics;
pub mod recorder;
