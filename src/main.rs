//! Sentitrack - sentiment analysis from the terminal
//!
//! A CLI client for a sentiment analysis service. Analyzes free text or the
//! comments of a Reddit post, one request at a time.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, output failure, etc.)
//!   2 - At least one analysis ended in an error, or the service is unhealthy

mod cli;
mod config;
mod error;
mod models;
mod render;
mod service;
mod session;
mod view;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use render::progress::start_spinner;
use render::Renderer;
use service::HttpAnalysisService;
use session::Session;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use view::{AnalyzerView, Phase};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Sentitrack v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .sentitrack.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the API URL, input mode, and display options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout only carries results.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch to the requested workflow. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let service = Arc::new(
        HttpAnalysisService::from_config(&config.api)
            .context("Failed to set up the analysis service client")?,
    );
    let renderer = Renderer::new(&config.display);
    let show_spinner = !args.quiet && renderer.format() == OutputFormat::Text;

    if args.health {
        return check_health(&service, &renderer).await;
    }

    if args.batch {
        config.validate_batch()?;
        return run_batch(&service, &renderer, &args.inputs, &config, show_spinner).await;
    }

    let mut view = AnalyzerView::new(service, &config.session);

    if args.is_interactive() {
        let mut session = Session::new(view, renderer, show_spinner);
        session.run_stdio().await?;
        info!(
            "Session ended with {} history entries",
            session.view().history().len()
        );
        return Ok(0);
    }

    run_once(&mut view, &renderer, &args.inputs, show_spinner).await
}

/// Submit each input in turn and print its outcome.
async fn run_once(
    view: &mut AnalyzerView<HttpAnalysisService>,
    renderer: &Renderer,
    inputs: &[String],
    show_spinner: bool,
) -> Result<i32> {
    let mut failures = 0;

    for input in inputs {
        let spinner = start_spinner(view.mode(), show_spinner);
        let phase = view.submit(input.as_str()).await;
        spinner.finish_and_clear();

        if phase == Phase::ErrorShown {
            failures += 1;
        }
        print!("{}", renderer.render_view(view)?);
    }

    if failures > 0 {
        warn!("{} of {} analyses failed", failures, inputs.len());
        return Ok(2);
    }
    Ok(0)
}

/// Handle --batch: validate all inputs, then send them in one request.
async fn run_batch(
    service: &HttpAnalysisService,
    renderer: &Renderer,
    inputs: &[String],
    config: &Config,
    show_spinner: bool,
) -> Result<i32> {
    let texts = match view::input::validate_batch(inputs, config.session.max_text_chars) {
        Ok(texts) => texts,
        Err(e) => {
            print!("{}", renderer.render_error(&e.to_string())?);
            return Ok(2);
        }
    };

    let spinner = start_spinner(models::InputMode::Text, show_spinner);
    let outcome = service.analyze_batch(&texts).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(batch) => {
            print!("{}", renderer.render_batch(&batch)?);
            Ok(0)
        }
        Err(e) => {
            warn!("Batch analysis failed: {}", e);
            print!("{}", renderer.render_error(&e.user_message())?);
            Ok(2)
        }
    }
}

/// Handle --health: query the service and report its status.
async fn check_health(service: &HttpAnalysisService, renderer: &Renderer) -> Result<i32> {
    info!("Checking service health at {}", service.base_url());

    match service.health().await {
        Ok(health) => {
            print!("{}", renderer.render_health(&health)?);
            Ok(if health.is_healthy() { 0 } else { 2 })
        }
        Err(e) => {
            warn!("Health check failed: {}", e);
            print!("{}", renderer.render_error(&e.to_string())?);
            Ok(2)
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
