//! The analyzer state machine.
//!
//! `Idle -> Submitting -> {ResultShown | ErrorShown}`, and back to
//! `Submitting` on the next accepted submission. At most one request is in
//! flight; a submission attempted meanwhile is rejected, not queued.

use super::history::History;
use super::input;
use crate::config::SessionConfig;
use crate::error::{ServiceError, SubmitError};
use crate::models::{AnalysisRequest, AnalysisResult, InputMode};
use crate::service::AnalysisService;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the view currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    ResultShown,
    ErrorShown,
}

/// Mutable view state. Only the view touches it.
#[derive(Debug, Clone)]
struct ViewState {
    input: String,
    in_flight: bool,
    error: Option<String>,
    result: Option<AnalysisResult>,
    history: History,
}

impl ViewState {
    fn finish(
        &mut self,
        request: &AnalysisRequest,
        outcome: Result<AnalysisResult, ServiceError>,
    ) {
        match outcome {
            Ok(result) => {
                if let Some(analysis) = result.as_text() {
                    let entry = self.history.record(analysis.clone());
                    debug!("Recorded history entry {}", entry.id);
                }
                // Keep anything typed after the request went out.
                if request.mode() == InputMode::Text && self.input.trim() == request.input() {
                    self.input.clear();
                }
                self.result = Some(result);
            }
            Err(e) => {
                warn!("Analysis failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
        self.in_flight = false;
    }
}

/// Clears the in-flight flag even if the pending call is dropped.
struct InFlight<'a> {
    state: &'a mut ViewState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.in_flight = false;
    }
}

/// A request that was accepted and must be completed with
/// [`AnalyzerView::complete`].
#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    request: AnalysisRequest,
}

impl Submission {
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// Collects one input, sends it to the analysis service, and shows the
/// outcome.
pub struct AnalyzerView<S> {
    service: Arc<S>,
    mode: InputMode,
    max_text_chars: usize,
    state: ViewState,
}

impl<S: AnalysisService> AnalyzerView<S> {
    pub fn new(service: Arc<S>, session: &SessionConfig) -> Self {
        Self {
            service,
            mode: session.mode,
            max_text_chars: session.max_text_chars,
            state: ViewState {
                input: String::new(),
                in_flight: false,
                error: None,
                result: None,
                history: History::new(session.history_limit),
            },
        }
    }

    /// Shared handle to the analysis service.
    pub fn service(&self) -> Arc<S> {
        Arc::clone(&self.service)
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch input mode. Rejected while a request is in flight.
    pub fn set_mode(&mut self, mode: InputMode) -> Result<(), SubmitError> {
        if self.state.in_flight {
            return Err(SubmitError::Busy);
        }
        if self.mode != mode {
            info!("Switching input mode to {}", mode);
            self.mode = mode;
            self.state.result = None;
            self.state.error = None;
        }
        Ok(())
    }

    pub fn input(&self) -> &str {
        &self.state.input
    }

    /// Replace the input buffer. Allowed at any time.
    pub fn update_input(&mut self, value: impl Into<String>) {
        self.state.input = value.into();
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.state.result.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn phase(&self) -> Phase {
        if self.state.in_flight {
            Phase::Submitting
        } else if self.state.error.is_some() {
            Phase::ErrorShown
        } else if self.state.result.is_some() {
            Phase::ResultShown
        } else {
            Phase::Idle
        }
    }

    /// Drop the shown result or error. No effect while submitting.
    pub fn clear(&mut self) {
        if !self.state.in_flight {
            self.state.result = None;
            self.state.error = None;
        }
    }

    /// Validate the input buffer and enter `Submitting`.
    ///
    /// Rejected submissions leave the in-flight request untouched. Invalid
    /// input shows an error and never reaches the service.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        if self.state.in_flight {
            debug!("Submission rejected: a request is already in flight");
            return Err(SubmitError::Busy);
        }

        let request = match input::build_request(self.mode, &self.state.input, self.max_text_chars)
        {
            Ok(request) => request,
            Err(e) => {
                self.state.result = None;
                self.state.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.state.in_flight = true;
        self.state.error = None;
        self.state.result = None;
        debug!("Submitting {} input: {}", self.mode, request.input());

        Ok(Submission { request })
    }

    /// Apply the service outcome for `submission` and leave `Submitting`.
    ///
    /// Ignored when no request is in flight.
    pub fn complete(
        &mut self,
        submission: Submission,
        outcome: Result<AnalysisResult, ServiceError>,
    ) -> Phase {
        if !self.state.in_flight {
            warn!(
                "Ignoring outcome for '{}': no request in flight",
                submission.request.input()
            );
            return self.phase();
        }
        self.state.finish(&submission.request, outcome);
        self.phase()
    }

    /// Replace the input with `value` and submit it, waiting for the reply.
    pub async fn submit(&mut self, value: impl Into<String>) -> Phase {
        self.update_input(value);
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(_) => return self.phase(),
        };

        let service = Arc::clone(&self.service);
        let mut guard = InFlight {
            state: &mut self.state,
        };
        let outcome = service.analyze(&submission.request).await;
        guard.state.finish(&submission.request, outcome);
        drop(guard);

        self.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FALLBACK_MESSAGE;
    use crate::models::{PostAnalysis, PostSummary, Sentiment, TextAnalysis};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records every request and answers from a script.
    struct FakeService {
        calls: Mutex<Vec<AnalysisRequest>>,
        reply: fn(&AnalysisRequest) -> Result<AnalysisResult, ServiceError>,
    }

    impl FakeService {
        fn new(reply: fn(&AnalysisRequest) -> Result<AnalysisResult, ServiceError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn calls(&self) -> Vec<AnalysisRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisService for FakeService {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<AnalysisResult, ServiceError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.reply)(request)
        }
    }

    fn positive(request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        Ok(AnalysisResult::SingleText(TextAnalysis {
            text: request.input().to_string(),
            label: Sentiment::Positive,
            score: 0.97,
            timestamp: Utc::now(),
        }))
    }

    fn unavailable(_: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        Err(ServiceError::from_body(
            500,
            r#"{"detail": "model unavailable"}"#,
        ))
    }

    fn unreachable(_: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        Err(ServiceError::Connect {
            url: "http://localhost:8000".to_string(),
        })
    }

    fn post_summary(_: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        Ok(AnalysisResult::PostSummary(PostAnalysis {
            summary: PostSummary {
                post_title: "Rust 2024".to_string(),
                total_comments_analyzed: 42,
                positive_count: 20,
                negative_count: 12,
                neutral_count: 8,
            },
            comments: Vec::new(),
        }))
    }

    fn text_view(service: Arc<FakeService>) -> AnalyzerView<FakeService> {
        AnalyzerView::new(service, &SessionConfig::default())
    }

    fn url_view(service: Arc<FakeService>) -> AnalyzerView<FakeService> {
        let session = SessionConfig {
            mode: InputMode::Url,
            ..SessionConfig::default()
        };
        AnalyzerView::new(service, &session)
    }

    #[tokio::test]
    async fn test_submit_sends_trimmed_text_once() {
        let service = FakeService::new(positive);
        let mut view = text_view(service.clone());

        let phase = view.submit("  I love this!  ").await;

        assert_eq!(phase, Phase::ResultShown);
        assert_eq!(
            service.calls(),
            vec![AnalysisRequest::Text {
                text: "I love this!".to_string()
            }]
        );
        let analysis = view.result().unwrap().as_text().unwrap();
        assert_eq!(analysis.label, Sentiment::Positive);
        assert!(!view.is_in_flight());
        assert_eq!(view.input(), "");
        assert_eq!(view.history().len(), 1);
        assert_eq!(view.history().latest().unwrap().analysis, *analysis);
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_service() {
        let service = FakeService::new(positive);
        let mut view = text_view(service.clone());

        let phase = view.submit("   ").await;

        assert_eq!(phase, Phase::ErrorShown);
        assert_eq!(view.error(), Some("Please enter some text to analyze"));
        assert!(service.calls().is_empty());
        assert!(!view.is_in_flight());
    }

    #[tokio::test]
    async fn test_service_detail_is_shown() {
        let service = FakeService::new(unavailable);
        let mut view = text_view(service.clone());

        let phase = view.submit("hello").await;

        assert_eq!(phase, Phase::ErrorShown);
        assert_eq!(view.error(), Some("model unavailable"));
        assert!(view.result().is_none());
        assert!(view.history().is_empty());
        assert!(!view.is_in_flight());
        assert_eq!(view.input(), "hello");
    }

    #[tokio::test]
    async fn test_transport_failure_uses_fallback() {
        let service = FakeService::new(unreachable);
        let mut view = text_view(service);

        view.submit("hello").await;
        assert_eq!(view.error(), Some(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_failure_keeps_history() {
        fn fail_second(request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
            if request.input() == "second" {
                unavailable(request)
            } else {
                positive(request)
            }
        }

        let service = FakeService::new(fail_second);
        let mut view = text_view(service);

        view.submit("first").await;
        view.submit("second").await;

        assert_eq!(view.history().len(), 1);
        assert_eq!(view.history().latest().unwrap().analysis.text, "first");
        assert!(view.result().is_none());
    }

    #[test]
    fn test_second_submission_rejected_while_in_flight() {
        let service = FakeService::new(positive);
        let mut view = text_view(service.clone());

        view.update_input("first");
        let submission = view.begin_submit().unwrap();
        assert_eq!(view.phase(), Phase::Submitting);

        view.update_input("second");
        assert_eq!(view.begin_submit(), Err(SubmitError::Busy));
        assert_eq!(view.phase(), Phase::Submitting);
        assert_eq!(view.input(), "second");
        assert!(service.calls().is_empty());

        let outcome = positive(&submission.request);
        assert_eq!(view.complete(submission, outcome), Phase::ResultShown);
        assert_eq!(view.input(), "second");

        let submission = view.begin_submit().unwrap();
        assert_eq!(
            submission.request(),
            &AnalysisRequest::Text {
                text: "second".to_string()
            }
        );
    }

    #[test]
    fn test_success_clears_unchanged_input() {
        let service = FakeService::new(positive);
        let mut view = text_view(service);

        view.update_input("  first ");
        let submission = view.begin_submit().unwrap();
        let outcome = positive(&submission.request);
        view.complete(submission, outcome);

        assert_eq!(view.input(), "");
    }

    #[test]
    fn test_outcome_applied_once() {
        let service = FakeService::new(positive);
        let mut view = text_view(service);

        view.update_input("once");
        let submission = view.begin_submit().unwrap();
        let outcome = positive(&submission.request);
        view.complete(submission, outcome);
        assert_eq!(view.history().len(), 1);

        let stale = Submission {
            request: AnalysisRequest::Text {
                text: "once".to_string(),
            },
        };
        let outcome = positive(&stale.request);
        assert_eq!(view.complete(stale, outcome), Phase::ResultShown);
        assert_eq!(view.history().len(), 1);

        let stale = Submission {
            request: AnalysisRequest::Text {
                text: "late".to_string(),
            },
        };
        let outcome = unavailable(&stale.request);
        assert_eq!(view.complete(stale, outcome), Phase::ResultShown);
        assert!(view.error().is_none());
    }

    #[test]
    fn test_begin_submit_clears_previous_outcome() {
        let service = FakeService::new(positive);
        let mut view = text_view(service);

        view.update_input("first");
        let submission = view.begin_submit().unwrap();
        let outcome = unavailable(&submission.request);
        view.complete(submission, outcome);
        assert!(view.error().is_some());

        view.update_input("again");
        view.begin_submit().unwrap();
        assert!(view.error().is_none());
        assert!(view.result().is_none());
    }

    #[tokio::test]
    async fn test_history_caps_at_ten() {
        let service = FakeService::new(positive);
        let mut view = text_view(service.clone());

        for i in 0..12 {
            let before = view.history().len();
            view.submit(format!("text {}", i)).await;
            assert_eq!(view.history().len(), (before + 1).min(10));
        }

        assert_eq!(service.calls().len(), 12);
        assert_eq!(view.history().latest().unwrap().analysis.text, "text 11");
        assert!(view.history().iter().all(|e| e.analysis.text != "text 1"));
    }

    #[tokio::test]
    async fn test_url_mode_keeps_input() {
        let service = FakeService::new(post_summary);
        let mut view = url_view(service.clone());

        let url = "https://www.reddit.com/r/rust/comments/abc/";
        let phase = view.submit(url).await;

        assert_eq!(phase, Phase::ResultShown);
        assert_eq!(view.input(), url);
        assert!(view.history().is_empty());
        assert_eq!(
            service.calls(),
            vec![AnalysisRequest::Post {
                post_url: url.to_string()
            }]
        );
    }

    #[test]
    fn test_url_mode_empty_input() {
        let service = FakeService::new(post_summary);
        let mut view = url_view(service.clone());

        tokio_test::block_on(view.submit(""));
        assert_eq!(view.error(), Some("Please enter a Reddit post URL"));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn test_mode_switch_rejected_while_in_flight() {
        let service = FakeService::new(positive);
        let mut view = text_view(service);

        view.update_input("hello");
        let _submission = view.begin_submit().unwrap();
        assert_eq!(view.set_mode(InputMode::Url), Err(SubmitError::Busy));
        assert_eq!(view.mode(), InputMode::Text);
    }

    #[test]
    fn test_too_long_text_rejected_locally() {
        let service = FakeService::new(positive);
        let mut view = text_view(service.clone());

        view.update_input("a".repeat(2001));
        assert!(matches!(
            view.begin_submit(),
            Err(SubmitError::Input(_))
        ));
        assert_eq!(view.phase(), Phase::ErrorShown);
        assert!(service.calls().is_empty());
    }
}
