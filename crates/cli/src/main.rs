use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use haven_http::{
    AppState, create_router, run_startup_recovery, start_background_processor,
    start_sweep_scheduler,
};
use haven_llm::LlmClient;
use haven_service::{LifecyclePolicy, LifecycleService};
use haven_storage::Storage;

#[derive(Parser)]
#[command(name = "haven")]
#[command(about = "Background orchestration service for AI-assisted journaling", long_about = None)]
struct Cli {
    /// Database file path. Defaults to the platform data directory.
    #[arg(long, env = "HAVEN_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server with the job worker and the sweep scheduler.
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print job queue statistics.
    Queue,
    /// List failed jobs.
    Failed {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Dispatch a status check for every active session, once.
    Sweep,
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("haven").join("haven.db")
}

fn api_key() -> Result<String> {
    std::env::var("HAVEN_API_KEY")
        .map_err(|_| anyhow::anyhow!("HAVEN_API_KEY environment variable must be set"))
}

fn base_url() -> String {
    std::env::var("HAVEN_API_BASE").unwrap_or_else(|_| "https://api.openai.com".to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let storage = Arc::new(Storage::new(&db_path)?);

    match cli.command {
        Commands::Serve { port, host } => {
            let llm = Arc::new(LlmClient::new(api_key()?, base_url())?);
            let state = Arc::new(AppState::new(storage, llm, LifecyclePolicy::from_env()));

            let released = run_startup_recovery(&state).await?;
            tracing::info!(released, "startup recovery complete");

            start_background_processor(Arc::clone(&state));
            start_sweep_scheduler(Arc::clone(&state));

            let router = create_router(state);
            let addr = format!("{host}:{port}");
            tracing::info!("Starting HTTP server on {addr}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        },
        Commands::Queue => {
            let stats = storage.get_queue_stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        },
        Commands::Failed { limit } => {
            let failed = storage.get_failed_jobs(limit)?;
            println!("{}", serde_json::to_string_pretty(&failed)?);
        },
        Commands::Sweep => {
            let lifecycle = LifecycleService::new(storage, LifecyclePolicy::from_env());
            let dispatched = lifecycle.sweep_active_sessions().await?;
            println!("dispatched {dispatched} session status checks");
        },
    }

    Ok(())
}
