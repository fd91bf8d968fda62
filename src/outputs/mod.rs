pub mod text;

pub use text::{ConsoleSink, ResultSink, TextBlock};
