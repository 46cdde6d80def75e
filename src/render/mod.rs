//! Output rendering.
//!
//! Results are printed either as terminal text ([`terminal`]) or as JSON.
//! The loading indicator lives in [`progress`].

pub mod progress;
pub mod terminal;

use crate::cli::OutputFormat;
use crate::config::DisplayConfig;
use crate::models::{AnalysisResult, BatchAnalysis, HealthStatus, HistoryEntry};
use crate::service::AnalysisService;
use crate::view::{AnalyzerView, History, Phase};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

/// Renders view state in the configured format.
#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    max_comments: usize,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            format: display.format,
            max_comments: display.max_comments,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render whatever the view currently shows.
    ///
    /// Idle and submitting views render nothing; the spinner covers loading.
    pub fn render_view<S: AnalysisService>(&self, view: &AnalyzerView<S>) -> Result<String> {
        match view.phase() {
            Phase::ResultShown => match view.result() {
                Some(result) => self.render_result(result),
                None => Ok(String::new()),
            },
            Phase::ErrorShown => self.render_error(view.error().unwrap_or_default()),
            Phase::Idle | Phase::Submitting => Ok(String::new()),
        }
    }

    pub fn render_result(&self, result: &AnalysisResult) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(terminal::render_result(result, self.max_comments)),
            OutputFormat::Json => to_json(result),
        }
    }

    pub fn render_error(&self, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(terminal::render_error(message)),
            OutputFormat::Json => to_json(&json!({ "error": message })),
        }
    }

    pub fn render_history(&self, history: &History) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(terminal::render_history(history)),
            OutputFormat::Json => to_json(&history.iter().collect::<Vec<&HistoryEntry>>()),
        }
    }

    pub fn render_batch(&self, batch: &BatchAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(terminal::render_batch(batch)),
            OutputFormat::Json => to_json(batch),
        }
    }

    pub fn render_health(&self, health: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(terminal::render_health(health)),
            OutputFormat::Json => to_json(health),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    output.push('\n');
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sentiment, TextAnalysis};
    use chrono::Utc;

    fn renderer(format: OutputFormat) -> Renderer {
        Renderer::new(&DisplayConfig {
            max_comments: 5,
            format,
        })
    }

    fn text_result() -> AnalysisResult {
        AnalysisResult::SingleText(TextAnalysis {
            text: "I love this!".to_string(),
            label: Sentiment::Positive,
            score: 0.97,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_render_result_text() {
        let output = renderer(OutputFormat::Text)
            .render_result(&text_result())
            .unwrap();
        assert!(output.contains("97.0%"));
        assert!(output.contains("positive"));
    }

    #[test]
    fn test_render_result_json() {
        let output = renderer(OutputFormat::Json)
            .render_result(&text_result())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["kind"], "single_text");
        assert_eq!(value["label"], "positive");
        assert_eq!(value["score"], 0.97);
    }

    #[test]
    fn test_render_error_json() {
        let output = renderer(OutputFormat::Json)
            .render_error("model unavailable")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["error"], "model unavailable");
    }
}
