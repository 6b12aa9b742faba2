//! priisme-cli — AI style analysis from the command line
//!
//! Drives the same client flow as the style page: pick a photo, send it to
//! the analysis proxy, show the profile, save it to the user's history.
//!
//! # Subcommands
//! - `analyze <photo> [--json]` — analyze a photo and save the result
//! - `history`                  — list previous analyses
//! - `show [index] [--json]`    — show a previous analysis (newest by default)
//! - `status`                   — show proxy health
//!
//! History is kept in Postgres when `--database-url` is given, otherwise only
//! for the lifetime of the process.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use priisme_core::config::DatabaseConfig;
use priisme_core::intake::SelectedFile;
use priisme_core::{
    db, AnalysisStore, AuthContext, HttpAnalysisProxy, MemoryAnalysisStore, Notice,
    PgAnalysisStore, ResultView, StoredAnalysis, StyleAnalysis, StyleSession, SubmitOutcome,
};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "priisme-cli",
    version,
    about = "PRIISME AI style analysis"
)]
struct Cli {
    /// Analysis proxy URL (overrides PRIISME_PROXY_URL env var)
    #[arg(long, env = "PRIISME_PROXY_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Signed-in user; analysis requires one
    #[arg(long, env = "PRIISME_USER_ID")]
    user_id: Option<Uuid>,

    /// Postgres URL for the analysis history
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a photo and save the result to your history
    Analyze {
        /// Path to the photo (the media type is taken from the extension)
        photo: std::path::PathBuf,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List your previous analyses
    History,

    /// Show a previous analysis
    Show {
        /// Position in the history listing, 1 is the most recent
        #[arg(default_value_t = 1)]
        index: usize,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show analysis proxy status
    Status,
}

// ============================================================================
// Output helpers
// ============================================================================

/// One-line rendering of a notice, e.g. "Analysis Failed: <message>".
pub fn notice_line(notice: &Notice) -> String {
    format!("{}: {}", notice.title(), notice.description())
}

/// History listing entry: "<n>. <Personality> Style  <date>".
pub fn history_line(position: usize, record: &StoredAnalysis) -> String {
    format!(
        "{}. {:<22} {}",
        position,
        record.label(),
        record.created_at.format("%Y-%m-%d")
    )
}

fn print_analysis(analysis: &StyleAnalysis, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.raw)?);
    } else {
        print!("{}", ResultView::new(analysis));
    }
    Ok(())
}

// ============================================================================
// Session wiring
// ============================================================================

async fn open_store(database_url: Option<&str>) -> anyhow::Result<Arc<dyn AnalysisStore>> {
    match database_url {
        Some(url) => {
            let pool = db::create_pool(&DatabaseConfig::new(url)).await?;
            db::migrate(&pool).await?;
            Ok(Arc::new(PgAnalysisStore::new(pool)))
        }
        None => {
            tracing::info!("No database configured; history lasts for this run only");
            Ok(Arc::new(MemoryAnalysisStore::new()))
        }
    }
}

async fn open_session(cli: &Cli, server: &str) -> anyhow::Result<StyleSession> {
    let proxy = HttpAnalysisProxy::new(server)?;
    let store = open_store(cli.database_url.as_deref()).await?;
    Ok(StyleSession::new(
        AuthContext::for_user_id(cli.user_id),
        Arc::new(proxy),
        store,
    ))
}

fn require_sign_in(session: &StyleSession) -> anyhow::Result<()> {
    if !session.auth().is_authenticated() {
        anyhow::bail!(
            "{} (sign in at {}, then pass --user-id)",
            notice_line(&Notice::SignInRequired),
            AuthContext::SIGN_IN_PATH
        );
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn do_analyze(mut session: StyleSession, photo: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let file = SelectedFile::from_path(photo).await?;
    let media_type = file.media_type.clone();

    let outcome = match session.submit_file(file).await {
        Some(outcome) => outcome,
        None => anyhow::bail!("{} is not an image ({})", photo.display(), media_type),
    };

    match &outcome {
        SubmitOutcome::SignInRequired { notice, redirect } => {
            anyhow::bail!("{} (sign in at {}, then pass --user-id)", notice_line(notice), redirect);
        }
        SubmitOutcome::Failed { notice } => anyhow::bail!("{}", notice_line(notice)),
        SubmitOutcome::Completed { notice } => eprintln!("{}", notice_line(notice)),
    }

    if let Some(analysis) = session.active_result() {
        print_analysis(analysis, json)?;
    }

    // The result is already shown; saving only has to finish before exit.
    if session.finish_pending_saves().await == 0 {
        eprintln!("priisme-cli: analysis was not saved to history");
    }
    Ok(())
}

async fn do_history(mut session: StyleSession) -> anyhow::Result<()> {
    require_sign_in(&session)?;
    session.load_history().await;

    let listing = session.history_listing();
    if listing.is_empty() {
        eprintln!("No previous analyses");
        return Ok(());
    }
    println!("Previous Analyses");
    for (i, record) in listing.iter().enumerate() {
        println!("  {}", history_line(i + 1, record));
    }
    Ok(())
}

async fn do_show(mut session: StyleSession, index: usize, json: bool) -> anyhow::Result<()> {
    require_sign_in(&session)?;
    session.load_history().await;

    let listed = session.history_listing().len();
    if index == 0 || index > listed || !session.select_history(index - 1) {
        anyhow::bail!("no analysis at position {}", index);
    }
    match session.active_result() {
        Some(analysis) => print_analysis(analysis, json),
        None => anyhow::bail!("no analysis at position {}", index),
    }
}

/// Show the proxy status by calling GET /health, and the history database
/// when one is configured.
async fn do_status(server: &str, database_url: Option<&str>) -> anyhow::Result<()> {
    if let Some(url) = database_url {
        let pool = db::create_pool(&DatabaseConfig::new(url)).await?;
        println!("PostgreSQL:    {}", db::health_check(&pool).await?);
    }

    let url = format!("{}/health", server);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().await.unwrap_or_default();
            println!("PRIISME proxy: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Model:         {}", body["model"].as_str().unwrap_or("?"));
            println!(
                "Configured:    {}",
                if body["configured"].as_bool().unwrap_or(false) { "yes" } else { "no" }
            );
        }
        Ok(r) => {
            anyhow::bail!("proxy unhealthy (HTTP {})", r.status());
        }
        Err(e) => {
            anyhow::bail!("cannot reach {}: {}", url, e);
        }
    }

    Ok(())
}

async fn run(cli: &Cli, server: &str) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Status => do_status(server, cli.database_url.as_deref()).await,
        Commands::Analyze { photo, json } => {
            do_analyze(open_session(cli, server).await?, photo, *json).await
        }
        Commands::History => do_history(open_session(cli, server).await?).await,
        Commands::Show { index, json } => {
            do_show(open_session(cli, server).await?, *index, *json).await
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let server = cli.server.trim_end_matches('/').to_string();

    if let Err(e) = run(&cli, &server).await {
        eprintln!("priisme-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
