use crate::services::llm::client::CompletionRequest;
use crate::world::snapshot::{Group, Snapshot};

pub const DEFAULT_PROMPT: &str = "What is the current game state?";

// Placeholders a template may embed. `{world}` is the full canonical text.
#[derive(Debug, Clone, Copy)]
enum Part {
    World,
    Group(Group),
}

const PLACEHOLDERS: &[(&str, Part)] = &[
    ("{world}", Part::World),
    ("{actors}", Part::Group(Group::Actors)),
    ("{lighting}", Part::Group(Group::Lighting)),
    ("{gameplay}", Part::Group(Group::Gameplay)),
    ("{player}", Part::Group(Group::Player)),
];

impl Part {
    fn render(self, snapshot: &Snapshot) -> String {
        match self {
            Part::World => snapshot.canonical_text(),
            Part::Group(group) => snapshot.group_text(group),
        }
    }
}

/// Derives the request body for a changed snapshot.
/// Never fails: an empty snapshot just renders empty groups.
pub trait PayloadComposer: Send {
    fn compose(&self, snapshot: &Snapshot) -> CompletionRequest;
}

/// Text template with optional world-state placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Single pass over the template, so placeholder-like text inside the
    /// substituted world state is never expanded again.
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let mut prompt = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            prompt.push_str(&rest[..start]);
            let tail = &rest[start..];
            match PLACEHOLDERS.iter().find(|(token, _)| tail.starts_with(token)) {
                Some((token, part)) => {
                    prompt.push_str(&part.render(snapshot));
                    rest = &tail[token.len()..];
                }
                None => {
                    prompt.push('{');
                    rest = &tail[1..];
                }
            }
        }
        prompt.push_str(rest);

        prompt
    }
}

impl PayloadComposer for PromptTemplate {
    fn compose(&self, snapshot: &Snapshot) -> CompletionRequest {
        CompletionRequest {
            prompt: self.render(snapshot),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}
