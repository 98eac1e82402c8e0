//! CLI binary for legal-guard.
//!
//! A thin shim over the library crate: maps flags and environment variables
//! onto `ReviewConfig`, then either serves the HTTP API or runs one review.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use legal_guard::checklist::parse_custom_clauses;
use legal_guard::{server, ContractReviewer, ContractSubmission, ReviewConfig, ReviewOutcome};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service
  legal-guard serve --port 8080

  # Review one contract and print the JSON report
  legal-guard review nda.pdf

  # Custom jurisdiction and clause checklist
  legal-guard review --jurisdiction "Hong Kong SAR" \
      --clauses '{"critical_clauses": ["escrow", "audit rights"]}' spa.pdf

ENVIRONMENT VARIABLES:
  LANYUN_API_KEY               Bearer token for the chat-completion endpoint
  LEGAL_GUARD_ENDPOINT         Override the chat-completion URL
  LEGAL_GUARD_MODEL            Override the model id
  LEGAL_GUARD_TIMEOUT          Upstream timeout in seconds
  LEGAL_GUARD_MAX_CHARS        Contract characters sent to the model
  LEGAL_GUARD_TEMP_DIR         Directory for temporary upload copies
  LEGAL_GUARD_PDFIUM_DIR       Directory containing libpdfium
  RUST_LOG                     Log filter (overrides --verbose)
"#;

/// Contract legal-risk review over a hosted LLM.
#[derive(Parser, Debug)]
#[command(
    name = "legal-guard",
    version,
    about = "Review PDF contracts for legal risk using a hosted LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// API key for the chat-completion endpoint.
    #[arg(long, env = "LANYUN_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Chat-completion URL.
    #[arg(long, env = "LEGAL_GUARD_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Model id sent upstream.
    #[arg(long, env = "LEGAL_GUARD_MODEL", global = true)]
    model: Option<String>,

    /// Name reported in `model_used`.
    #[arg(long, env = "LEGAL_GUARD_MODEL_NAME", global = true)]
    model_name: Option<String>,

    /// Upstream timeout in seconds.
    #[arg(long, env = "LEGAL_GUARD_TIMEOUT", default_value_t = 30, global = true)]
    timeout: u64,

    /// Contract characters embedded in the prompt.
    #[arg(long, env = "LEGAL_GUARD_MAX_CHARS", default_value_t = 15_000, global = true)]
    max_chars: usize,

    /// Directory for temporary upload copies.
    #[arg(long, env = "LEGAL_GUARD_TEMP_DIR", global = true)]
    temp_dir: Option<PathBuf>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "LEGAL_GUARD_PDFIUM_DIR", global = true)]
    pdfium_dir: Option<PathBuf>,

    /// Reject model replies missing the three findings keys.
    #[arg(long, env = "LEGAL_GUARD_STRICT", global = true)]
    strict: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LEGAL_GUARD_VERBOSE", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve /tools, /execute and /health over HTTP.
    Serve {
        #[arg(long, env = "LEGAL_GUARD_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, env = "LEGAL_GUARD_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Review a single PDF and print the JSON outcome.
    Review {
        /// Contract PDF.
        file: PathBuf,

        /// Governing jurisdiction.
        #[arg(short, long)]
        jurisdiction: Option<String>,

        /// Parameters JSON, e.g. '{"critical_clauses": ["escrow"]}'.
        #[arg(long)]
        clauses: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build reviewer ───────────────────────────────────────────────────
    let config = build_config(&cli.global)?;
    if config.api_key.is_empty() {
        tracing::warn!("LANYUN_API_KEY is not set; upstream calls will be rejected");
    }
    let reviewer = ContractReviewer::new(config).context("Failed to initialise reviewer")?;

    match cli.command {
        Command::Serve { host, port } => {
            serve(reviewer, &host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Review {
            file,
            jurisdiction,
            clauses,
        } => review_once(reviewer, file, jurisdiction, clauses).await,
    }
}

fn build_config(opts: &GlobalOpts) -> Result<ReviewConfig> {
    let mut builder = ReviewConfig::builder()
        .timeout_secs(opts.timeout)
        .max_document_chars(opts.max_chars)
        .strict_report(opts.strict);

    if let Some(ref key) = opts.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref url) = opts.endpoint {
        builder = builder.endpoint(url.clone());
    }
    if let Some(ref model) = opts.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref name) = opts.model_name {
        builder = builder.model_display_name(name.clone());
    }
    if let Some(ref dir) = opts.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if let Some(ref dir) = opts.pdfium_dir {
        builder = builder.pdfium_library_dir(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

async fn serve(reviewer: ContractReviewer, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("legal-guard listening on http://{}", addr);

    axum::serve(listener, server::router(reviewer))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("legal-guard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
}

async fn review_once(
    reviewer: ContractReviewer,
    file: PathBuf,
    jurisdiction: Option<String>,
    clauses: Option<String>,
) -> Result<ExitCode> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contract.pdf".to_string());

    let jurisdiction =
        jurisdiction.unwrap_or_else(|| reviewer.config().default_jurisdiction.clone());
    let submission = ContractSubmission::new(file_name, bytes)
        .jurisdiction(jurisdiction)
        .custom_clauses(clauses.as_deref().and_then(parse_custom_clauses));

    let outcome = reviewer.review(submission).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
    );

    Ok(ExitCode::from(exit_status(&outcome)))
}

/// Process exit status for a finished review: 0 for a report, 2 for an
/// error envelope.
fn exit_status(outcome: &ReviewOutcome) -> u8 {
    if outcome.is_report() {
        0
    } else {
        2
    }
}
