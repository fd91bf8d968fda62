pub mod client;
pub mod extract;

pub use client::{ClientError, CompletionClient, CompletionRequest};
pub use extract::{extract, ExtractOutcome, FALLBACK_MESSAGE};
