//! Interactive analyzer session.
//!
//! Reads one line at a time from stdin. Plain lines are submitted; lines
//! starting with `:` are commands. Input keeps being read while a request is
//! in flight, so a new line updates the input buffer but its submission is
//! rejected until the pending reply has been applied.
//!
//! With JSON output, stdout only carries rendered documents; prompts and
//! notices go to stderr.

use crate::cli::OutputFormat;
use crate::error::{ServiceError, SubmitError};
use crate::models::{AnalysisResult, InputMode};
use crate::render::progress::start_spinner;
use crate::render::Renderer;
use crate::service::AnalysisService;
use crate::view::{AnalyzerView, Submission};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use indicatif::ProgressBar;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  <text>          submit text (or a post URL in url mode)
  :mode url|text  switch input mode
  :history        show recent text analyses
  :clear          clear the current result or error
  :help           show this help
  :quit           exit (waits for a pending analysis)
";

/// A request sent to the service whose reply has not been applied yet.
struct Pending {
    submission: Submission,
    response: BoxFuture<'static, Result<AnalysisResult, ServiceError>>,
    spinner: ProgressBar,
}

/// Parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Submit(String),
    Mode(InputMode),
    History,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix(':') else {
            return Command::Submit(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("q" | "quit" | "exit"), _) => Command::Quit,
            (Some("history" | "h"), _) => Command::History,
            (Some("clear"), _) => Command::Clear,
            (Some("help" | "?"), _) => Command::Help,
            (Some("mode"), Some("url")) => Command::Mode(InputMode::Url),
            (Some("mode"), Some("text")) => Command::Mode(InputMode::Text),
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

/// Drives an [`AnalyzerView`] from line-oriented input.
pub struct Session<S> {
    view: AnalyzerView<S>,
    renderer: Renderer,
    show_spinner: bool,
    pending: Option<Pending>,
    quitting: bool,
}

impl<S: AnalysisService + 'static> Session<S> {
    pub fn new(view: AnalyzerView<S>, renderer: Renderer, show_spinner: bool) -> Self {
        Self {
            view,
            renderer,
            show_spinner,
            pending: None,
            quitting: false,
        }
    }

    pub fn view(&self) -> &AnalyzerView<S> {
        &self.view
    }

    /// Run on stdin/stdout until `:quit` or end of input.
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.run(stdin, &mut stdout).await
    }

    /// Run until `:quit` or end of input. A pending request always runs to
    /// completion before this returns.
    pub async fn run<R, W>(&mut self, reader: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut input_open = true;

        info!("Interactive session started in {} mode", self.view.mode());
        self.notice(
            out,
            &format!("Mode: {}. Type :help for commands.\n", self.view.mode()),
        )
        .await?;

        loop {
            if self.pending.is_none() && (self.quitting || !input_open) {
                break;
            }

            tokio::select! {
                outcome = wait_for(&mut self.pending) => {
                    self.finish_pending(outcome, out).await?;
                }
                line = lines.next_line(), if input_open && !self.quitting => {
                    match line.context("Failed to read input")? {
                        Some(line) => self.handle_line(&line, out).await?,
                        None => {
                            debug!("End of input");
                            input_open = false;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_line<W: AsyncWrite + Unpin>(&mut self, line: &str, out: &mut W) -> Result<()> {
        match Command::parse(line) {
            Command::Submit(text) => {
                self.view.update_input(text);
                self.start_submission(out).await?;
            }
            Command::Mode(mode) => match self.view.set_mode(mode) {
                Ok(()) => self.notice(out, &format!("Mode: {}\n", mode)).await?,
                Err(_) => {
                    self.notice(out, "⏳ Cannot switch mode while an analysis is running.\n")
                        .await?
                }
            },
            Command::History => {
                let rendered = self.renderer.render_history(self.view.history())?;
                write_out(out, &rendered).await?;
            }
            Command::Clear => self.view.clear(),
            Command::Help => self.notice(out, HELP).await?,
            Command::Quit => {
                self.quitting = true;
                if self.view.is_in_flight() {
                    self.notice(out, "Waiting for the current analysis to finish...\n")
                        .await?;
                }
            }
            Command::Unknown(command) => {
                self.notice(out, &format!("Unknown command: {}\n{}", command, HELP))
                    .await?
            }
        }
        Ok(())
    }

    async fn start_submission<W: AsyncWrite + Unpin>(&mut self, out: &mut W) -> Result<()> {
        match self.view.begin_submit() {
            Ok(submission) => {
                let service = self.view.service();
                let request = submission.request().clone();
                let response: BoxFuture<'static, _> =
                    Box::pin(async move { service.analyze(&request).await });

                self.pending = Some(Pending {
                    submission,
                    response,
                    spinner: start_spinner(self.view.mode(), self.show_spinner),
                });
            }
            Err(SubmitError::Busy) => {
                let message = format!(
                    "⏳ An analysis is already running; kept \"{}\" as input but did not submit it.\n",
                    self.view.input()
                );
                self.notice(out, &message).await?;
            }
            Err(SubmitError::Input(_)) => {
                let rendered = self.renderer.render_view(&self.view)?;
                write_out(out, &rendered).await?;
            }
        }
        Ok(())
    }

    async fn finish_pending<W: AsyncWrite + Unpin>(
        &mut self,
        outcome: Result<AnalysisResult, ServiceError>,
        out: &mut W,
    ) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            pending.spinner.finish_and_clear();
            self.view.complete(pending.submission, outcome);
            let rendered = self.renderer.render_view(&self.view)?;
            write_out(out, &rendered).await?;
        }
        Ok(())
    }

    /// Prose for the user: stdout in text mode, stderr in JSON mode.
    async fn notice<W: AsyncWrite + Unpin>(&self, out: &mut W, text: &str) -> Result<()> {
        match self.renderer.format() {
            OutputFormat::Text => write_out(out, text).await,
            OutputFormat::Json => {
                eprint!("{}", text);
                Ok(())
            }
        }
    }
}

/// Resolves with the pending reply, or never when nothing is pending.
async fn wait_for(pending: &mut Option<Pending>) -> Result<AnalysisResult, ServiceError> {
    match pending {
        Some(pending) => pending.response.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn write_out<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .await
        .context("Failed to write output")?;
    out.flush().await.context("Failed to flush output")
}
