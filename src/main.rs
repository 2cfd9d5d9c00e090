use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod engines;
mod error;
mod server;
mod session;
mod tool_config;
mod transport;
mod upload;

#[derive(Parser, Debug)]
#[command(name = "ocr-tool-selector")]
#[command(about = "Pick an OCR backend, configure it, upload a document, get the text")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "8501")]
    pub port: u16,

    /// OCR.Space parse endpoint
    #[arg(
        long,
        env = "OCR_SPACE_ENDPOINT",
        default_value = engines::ocr_space::DEFAULT_ENDPOINT
    )]
    pub ocr_space_endpoint: String,

    /// Maximum HTTP upload size in bytes (default: 10MB)
    #[arg(long, env = "OCR_MAX_UPLOAD_SIZE", default_value = "10485760")]
    pub max_upload_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!("Starting ocr-tool-selector v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
