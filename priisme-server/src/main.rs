use clap::Parser;
use priisme_core::PriismeConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "priisme.toml")]
    config: String,

    /// Report configuration and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience; production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match PriismeConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    if args.health {
        match config.gateway.api_key() {
            Some(_) => println!("✅ Gateway credential found in {}", config.gateway.api_key_env),
            None => {
                println!("❌ Gateway credential missing: set {}", config.gateway.api_key_env);
                std::process::exit(1);
            }
        }
        println!("✅ Model: {}", config.gateway.model);
        println!("✅ Gateway: {}", config.gateway.base_url);
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    priisme_server::http::start_http_server(config, tx.subscribe()).await?;

    Ok(())
}
