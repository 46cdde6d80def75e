//! Data models for the sentiment client.
//!
//! This module contains the request and response shapes exchanged with the
//! analysis service, plus the client-side history entries built from them.

use crate::error::ServiceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which kind of input the analyzer collects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// A Reddit post URL, analyzed comment by comment.
    Url,
    /// A single piece of free text (default).
    #[default]
    Text,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Url => write!(f, "url"),
            InputMode::Text => write!(f, "text"),
        }
    }
}

/// Sentiment classification label.
///
/// Deserialization is lenient, see [`Sentiment::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

impl Sentiment {
    /// Returns an emoji representation of the sentiment.
    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "🟢",
            Sentiment::Negative => "🔴",
            Sentiment::Neutral => "🟡",
        }
    }

    /// Normalise a raw label coming from the service.
    ///
    /// Labels are matched case-insensitively. Star ratings produced by
    /// review-style models map onto the three categories; anything else
    /// falls back to neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" | "4 stars" | "5 stars" => Sentiment::Positive,
            "negative" | "neg" | "1 star" | "2 stars" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Sentiment::from_label(&raw))
    }
}

/// Body sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnalysisRequest {
    /// `{ "post_url": ... }` for URL mode.
    Post { post_url: String },
    /// `{ "text": ... }` for text mode.
    Text { text: String },
}

impl AnalysisRequest {
    /// The mode this request belongs to.
    pub fn mode(&self) -> InputMode {
        match self {
            AnalysisRequest::Post { .. } => InputMode::Url,
            AnalysisRequest::Text { .. } => InputMode::Text,
        }
    }

    /// Endpoint path relative to the service base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            AnalysisRequest::Post { .. } => "/api/v1/reddit/analyze",
            AnalysisRequest::Text { .. } => "/analyze",
        }
    }

    /// The submitted input value.
    pub fn input(&self) -> &str {
        match self {
            AnalysisRequest::Post { post_url } => post_url,
            AnalysisRequest::Text { text } => text,
        }
    }
}

/// Success body of the text endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextScore {
    pub label: Sentiment,
    pub score: f64,
}

/// Sentiment of a single piece of free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    /// The text that was analyzed (trimmed).
    pub text: String,
    /// Assigned sentiment label.
    pub label: Sentiment,
    /// Confidence in `[0, 1]`.
    pub score: f64,
    /// When the response was received.
    pub timestamp: DateTime<Utc>,
}

impl TextAnalysis {
    /// Build from the service reply for `text`.
    ///
    /// A score outside `[0, 1]` makes the reply malformed.
    pub fn from_score(text: String, reply: TextScore) -> Result<Self, ServiceError> {
        if !(0.0..=1.0).contains(&reply.score) {
            return Err(ServiceError::Malformed(format!(
                "score {} is outside [0, 1]",
                reply.score
            )));
        }

        Ok(Self {
            text,
            label: reply.label,
            score: reply.score,
            timestamp: Utc::now(),
        })
    }
}

/// One analyzed comment of a Reddit post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedComment {
    pub text: String,
    pub author: String,
    pub sentiment: Sentiment,
    /// Confidence of the comment classification, when the service sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Aggregate counts for an analyzed Reddit post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_title: String,
    pub total_comments_analyzed: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

impl PostSummary {
    /// Count for one sentiment category.
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive_count,
            Sentiment::Negative => self.negative_count,
            Sentiment::Neutral => self.neutral_count,
        }
    }

    /// Sum of the three category counts.
    ///
    /// May be lower than `total_comments_analyzed`: comments without a clear
    /// sentiment are not counted in any category.
    pub fn categorized(&self) -> usize {
        self.positive_count + self.negative_count + self.neutral_count
    }

    /// Share of a category over all analyzed comments, as a percentage.
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        if self.total_comments_analyzed == 0 {
            return 0.0;
        }
        self.count(sentiment) as f64 / self.total_comments_analyzed as f64 * 100.0
    }
}

/// Full sentiment analysis of a Reddit post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysis {
    pub summary: PostSummary,
    #[serde(default)]
    pub comments: Vec<AnalyzedComment>,
}

/// Result shown by the analyzer, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    PostSummary(PostAnalysis),
    SingleText(TextAnalysis),
}

impl AnalysisResult {
    /// Returns the text analysis when this is a single-text result.
    pub fn as_text(&self) -> Option<&TextAnalysis> {
        match self {
            AnalysisResult::SingleText(analysis) => Some(analysis),
            AnalysisResult::PostSummary(_) => None,
        }
    }
}

/// A text analysis remembered by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub analysis: TextAnalysis,
}

impl HistoryEntry {
    pub fn new(analysis: TextAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            analysis,
        }
    }
}

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// One item of a batch analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Possibly shortened echo of the submitted text.
    pub text: String,
    pub sentiment: TextScore,
}

/// Response of the batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub results: Vec<BatchItem>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("positive"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("3 stars"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label("5 stars"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("1 star"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("mixed"), Sentiment::Neutral);
    }

    #[test]
    fn test_request_body_shape() {
        let text = AnalysisRequest::Text {
            text: "I love this!".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&text).unwrap(),
            serde_json::json!({"text": "I love this!"})
        );
        assert_eq!(text.endpoint(), "/analyze");

        let post = AnalysisRequest::Post {
            post_url: "https://www.reddit.com/r/rust/comments/abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            serde_json::json!({"post_url": "https://www.reddit.com/r/rust/comments/abc"})
        );
        assert_eq!(post.endpoint(), "/api/v1/reddit/analyze");
        assert_eq!(post.mode(), InputMode::Url);
    }

    #[test]
    fn test_text_score_parsing() {
        let reply: TextScore =
            serde_json::from_str(r#"{"label": "Positive", "score": 0.97}"#).unwrap();
        let analysis = TextAnalysis::from_score("I love this!".to_string(), reply).unwrap();
        assert_eq!(analysis.label, Sentiment::Positive);
        assert_eq!(analysis.score, 0.97);
        assert_eq!(analysis.text, "I love this!");
    }

    #[test]
    fn test_score_out_of_range() {
        for score in [1.5, -0.1, f64::NAN] {
            let reply = TextScore {
                label: Sentiment::Positive,
                score,
            };
            let err = TextAnalysis::from_score("hi".to_string(), reply).unwrap_err();
            assert!(matches!(err, ServiceError::Malformed(_)));
        }
    }

    #[test]
    fn test_post_analysis_parsing() {
        let body = r#"{
            "summary": {
                "post_title": "Rust 2024 edition released",
                "total_comments_analyzed": 42,
                "positive_count": 20,
                "negative_count": 10,
                "neutral_count": 9
            },
            "comments": [
                {"text": "Great news", "author": "ferris", "sentiment": "positive", "score": 0.91},
                {"text": "Meh", "author": "bob", "sentiment": "neutral"}
            ]
        }"#;

        let analysis: PostAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(analysis.summary.total_comments_analyzed, 42);
        assert!(analysis.summary.categorized() <= 42);
        assert_eq!(analysis.comments.len(), 2);
        assert_eq!(analysis.comments[0].score, Some(0.91));
        assert_eq!(analysis.comments[1].score, None);
        assert_eq!(analysis.comments[1].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_summary_percentage() {
        let summary = PostSummary {
            post_title: "t".to_string(),
            total_comments_analyzed: 4,
            positive_count: 1,
            negative_count: 2,
            neutral_count: 1,
        };
        assert_eq!(summary.percentage(Sentiment::Negative), 50.0);
        assert_eq!(PostSummary::default().percentage(Sentiment::Positive), 0.0);
    }

    #[test]
    fn test_result_tag() {
        let result = AnalysisResult::SingleText(TextAnalysis {
            text: "ok".to_string(),
            label: Sentiment::Neutral,
            score: 0.5,
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "single_text");
        assert!(result.as_text().is_some());
    }
}
