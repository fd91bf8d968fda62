pub mod prompt;

pub use prompt::{PayloadComposer, PromptTemplate, DEFAULT_PROMPT};
