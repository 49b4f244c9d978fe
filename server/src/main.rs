use anyhow::Result;
use axum::Router;
use clap::Parser;
use orderdesk_server::gemini::GeminiConfig;
use orderdesk_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Orders file (.json/.jsonl) or directory; built-in demo orders if omitted
    #[arg(long)]
    orders: Option<PathBuf>,
    /// Directory with index.html and other static assets
    #[arg(long, default_value = "./static")]
    static_dir: PathBuf,
    /// Number of similarity matches returned when a request omits top_k
    #[arg(long, default_value_t = 3)]
    top_k: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        orders_path: args.orders,
        static_dir: args.static_dir,
        default_top_k: args.top_k,
        gemini: GeminiConfig::from_env(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
