//! Blame Viewer - serves line attribution for a git repository over HTTP
//!
//! # Usage
//! ```bash
//! blame-viewer /path/to/repository                 # Start server
//! blame-viewer . --port 4000 --page-size 500      # Custom port and pages
//! BLAME_PAGINATION_THRESHOLD=5000 blame-viewer .   # Configure via env
//! ```

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blame_viewer::config::{BlameConfig, DEFAULT_PAGE_SIZE, DEFAULT_PAGINATION_THRESHOLD};
use blame_viewer::git::GitRepository;
use blame_viewer::routes::{self, AppState};

/// Blame Viewer - browse line attribution of a git repository
#[derive(Parser)]
#[command(name = "blame-viewer")]
#[command(about = "Serve ignore-aware, paginated git blame over HTTP", long_about = None)]
struct Cli {
    /// Path to the git repository
    #[arg(value_name = "REPO_PATH", default_value = ".")]
    repo_path: String,

    /// Port to run the server on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Lines per page in paginated and streaming blame
    #[arg(long, env = "BLAME_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Files longer than this are paginated unless the request opts out
    #[arg(long, env = "BLAME_PAGINATION_THRESHOLD", default_value_t = DEFAULT_PAGINATION_THRESHOLD)]
    pagination_threshold: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BlameConfig {
        page_size: cli.page_size,
        pagination_threshold: cli.pagination_threshold,
    }
    .validate()?;

    let repo = GitRepository::open(&cli.repo_path)
        .with_context(|| format!("Failed to open repository at {}", cli.repo_path))?;

    let canonical_path = std::fs::canonicalize(&cli.repo_path)
        .unwrap_or_else(|_| PathBuf::from(&cli.repo_path))
        .to_string_lossy()
        .to_string();

    let state = AppState {
        repo: Arc::new(RwLock::new(repo)),
        config,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to port {} (try --port <PORT>)", cli.port))?;

    println!();
    println!("  Repository: {}", canonical_path);
    println!("  Server:     http://{}", addr);
    println!(
        "  Pages:      {} lines, above {} lines",
        config.page_size, config.pagination_threshold
    );
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    tracing::info!("Serving blame for {} on {}", canonical_path, addr);

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
