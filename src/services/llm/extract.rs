use serde_json::Value;
use tracing::{error, info};

use crate::kernel::event::CompletionDelivery;

/// Shown for every outcome that did not yield text.
pub const FALLBACK_MESSAGE: &str = "Failed to fetch or parse game state.";

/// Terminal outcome of reading one completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    TransportError,
    ParseError,
    MissingChoices,
    MalformedChoice,
    Extracted(String),
}

impl ExtractOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, ExtractOutcome::Extracted(_))
    }

    /// The user-visible message for this outcome.
    pub fn message(&self) -> &str {
        match self {
            ExtractOutcome::Extracted(text) => text,
            _ => FALLBACK_MESSAGE,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            ExtractOutcome::Extracted(text) => text,
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

pub fn extract(delivery: &CompletionDelivery) -> ExtractOutcome {
    classify(&delivery.body, delivery.success)
}

/// Pure classification of a raw body. Only `choices[0].text` is consumed.
pub fn classify(body: &str, success: bool) -> ExtractOutcome {
    if !success {
        error!("Completion request failed or response is invalid.");
        return ExtractOutcome::TransportError;
    }

    // The document root must be an object
    let root = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(root)) => root,
        Ok(_) | Err(_) => {
            error!("Failed to deserialize JSON response.");
            return ExtractOutcome::ParseError;
        }
    };

    let choices = match root.get("choices").and_then(Value::as_array) {
        Some(choices) if !choices.is_empty() => choices,
        _ => {
            error!("Failed to find or parse 'choices' array.");
            return ExtractOutcome::MissingChoices;
        }
    };
    info!("'choices' array found with {} elements.", choices.len());

    let Some(choice) = choices[0].as_object() else {
        error!("choices[0] is not an object.");
        return ExtractOutcome::MalformedChoice;
    };

    // Numbers and booleans read as text; null, arrays and objects do not
    match choice.get("text") {
        Some(Value::String(text)) => ExtractOutcome::Extracted(text.clone()),
        Some(Value::Number(n)) => ExtractOutcome::Extracted(n.to_string()),
        Some(Value::Bool(b)) => ExtractOutcome::Extracted(b.to_string()),
        _ => {
            error!("Failed to extract 'text' field from 'choices[0]'.");
            ExtractOutcome::MalformedChoice
        }
    }
}
