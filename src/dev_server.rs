use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{routing::get, Router};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "content-server")]
#[command(about = "Serve generated content JSON to the page layer during development")]
struct Args {
    /// Directory holding the generated artifacts
    #[arg(short, long, default_value = "data")]
    dir: PathBuf,

    #[arg(short, long, default_value_t = 3001)]
    port: u16,
}

fn router(dir: &Path) -> Router {
    Router::new()
        .route("/", get(|| async { "Portfolio content server - artifacts are under /data" }))
        .nest_service("/data", ServeDir::new(dir))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("content_server=info".parse()?))
        .with_target(false)
        .init();

    let args = Args::parse();
    if !args.dir.is_dir() {
        anyhow::bail!(
            "{} does not exist; run `content-generator all` first",
            args.dir.display()
        );
    }

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], args.port))).await?;
    info!("🚀 Content server running on http://localhost:{}", args.port);
    info!("📖 Artifacts available at http://localhost:{}/data", args.port);

    axum::serve(listener, router(&args.dir)).await?;
    Ok(())
}
