//! The analyzer view: input handling, request lifecycle and history.

pub mod analyzer;
pub mod history;
pub mod input;

pub use analyzer::{AnalyzerView, Phase, Submission};
pub use history::History;
