//! Human-readable terminal output.
//!
//! This module formats analysis results, history and service status as
//! plain text for stdout.

use crate::models::{
    AnalysisResult, AnalyzedComment, BatchAnalysis, HealthStatus, PostAnalysis, PostSummary,
    Sentiment, TextAnalysis,
};
use crate::view::History;

/// Longest comment excerpt printed, in characters.
const MAX_COMMENT_CHARS: usize = 280;

/// Confidence score as a percentage with one decimal, e.g. `97.0%`.
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Render any analysis result.
pub fn render_result(result: &AnalysisResult, max_comments: usize) -> String {
    match result {
        AnalysisResult::SingleText(analysis) => render_text_analysis(analysis),
        AnalysisResult::PostSummary(analysis) => render_post_analysis(analysis, max_comments),
    }
}

/// Render the sentiment of one text.
pub fn render_text_analysis(analysis: &TextAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} Sentiment: {}\n",
        analysis.label.emoji(),
        analysis.label
    ));
    output.push_str(&format!(
        "   Confidence: {}\n",
        format_confidence(analysis.score)
    ));
    output.push_str(&format!(
        "   Text: \"{}\"\n",
        truncate_chars(&analysis.text, MAX_COMMENT_CHARS)
    ));
    output.push_str(&format!(
        "   Analyzed at: {}\n",
        analysis.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

/// Render a Reddit post analysis: summary counts followed by comments.
pub fn render_post_analysis(analysis: &PostAnalysis, max_comments: usize) -> String {
    let mut output = String::new();

    output.push_str(&render_summary(&analysis.summary));

    if analysis.comments.is_empty() || max_comments == 0 {
        return output;
    }

    let shown = analysis.comments.len().min(max_comments);
    output.push_str(&format!(
        "\n💬 Highlighted comments (showing {} of {}):\n",
        shown,
        analysis.comments.len()
    ));
    for comment in analysis.comments.iter().take(max_comments) {
        output.push_str(&render_comment(comment));
    }

    output
}

/// Render the per-category counts of a post.
fn render_summary(summary: &PostSummary) -> String {
    let mut section = String::new();

    section.push_str(&format!("📊 Post analysis: \"{}\"\n\n", summary.post_title));
    for (sentiment, name) in [
        (Sentiment::Positive, "Positive"),
        (Sentiment::Negative, "Negative"),
        (Sentiment::Neutral, "Neutral"),
    ] {
        section.push_str(&format!(
            "   {} {:<9} {:>5}  ({:.1}%)\n",
            sentiment.emoji(),
            format!("{}:", name),
            summary.count(sentiment),
            summary.percentage(sentiment)
        ));
    }
    section.push_str(&format!(
        "\n   Total comments analyzed: {}\n",
        summary.total_comments_analyzed
    ));

    let uncategorized = summary
        .total_comments_analyzed
        .saturating_sub(summary.categorized());
    if uncategorized > 0 {
        section.push_str(&format!(
            "   Without a clear sentiment: {}\n",
            uncategorized
        ));
    }

    section
}

fn render_comment(comment: &AnalyzedComment) -> String {
    let score = comment
        .score
        .map(|s| format!(" ({})", format_confidence(s)))
        .unwrap_or_default();

    format!(
        "   {} \"{}\"\n      - u/{}{}\n",
        comment.sentiment.emoji(),
        truncate_chars(comment.text.trim(), MAX_COMMENT_CHARS),
        comment.author,
        score
    )
}

/// Render history entries, newest first.
pub fn render_history(history: &History) -> String {
    if history.is_empty() {
        return "🕘 History is empty.\n".to_string();
    }

    let mut output = format!(
        "🕘 History ({} of {}):\n",
        history.len(),
        history.limit()
    );
    for (index, entry) in history.iter().enumerate() {
        let analysis = &entry.analysis;
        output.push_str(&format!(
            "   {:>2}. {} {:<8} {:>6}  \"{}\"  ({})\n",
            index + 1,
            analysis.label.emoji(),
            analysis.label.to_string(),
            format_confidence(analysis.score),
            truncate_chars(&analysis.text, 60),
            entry.recorded_at.format("%H:%M:%S")
        ));
    }

    output
}

/// Render the items of a batch analysis.
pub fn render_batch(batch: &BatchAnalysis) -> String {
    let mut output = format!("📦 Batch results ({}):\n", batch.count);

    for (index, item) in batch.results.iter().enumerate() {
        output.push_str(&format!(
            "   {:>2}. {} {:<8} {:>6}  \"{}\"\n",
            index + 1,
            item.sentiment.label.emoji(),
            item.sentiment.label.to_string(),
            format_confidence(item.sentiment.score),
            item.text
        ));
    }

    output
}

/// Render the service health status.
pub fn render_health(health: &HealthStatus) -> String {
    let version = health
        .version
        .as_deref()
        .map(|v| format!(" (version {})", v))
        .unwrap_or_default();

    if health.is_healthy() {
        format!("✅ Service healthy{}: {}\n", version, health.message)
    } else {
        format!("⚠️  Service {}{}: {}\n", health.status, version, health.message)
    }
}

/// Render an error message.
pub fn render_error(message: &str) -> String {
    format!("❌ {}\n", message)
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
