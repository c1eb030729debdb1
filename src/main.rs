use clap::Parser;
use dotenvy::dotenv;
use pixelpress::services::browser;
use pixelpress::services::compressor::{Compressor, Pngquant};
use pixelpress::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to run the server on (default: 60031)
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep staged and optimized files instead of deleting them per request
    #[arg(long)]
    keep_files: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelpress=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = pixelpress::config::AppConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    config.keep_files = config.keep_files || args.keep_files;

    info!("🚀 Starting pixelpress...");
    info!(
        "🗜️  Compressor={}, Uploads={}, Keep files={}",
        config.compressor_cmd,
        config.upload_dir.display(),
        config.keep_files
    );

    // The external compressor is a hard requirement; refuse to start
    // without it rather than fail on the first upload.
    let compressor: Arc<dyn Compressor> = Arc::new(Pngquant::new(config.compressor_cmd.as_str()));
    compressor.probe().await?;

    let port = config.port;
    let state = AppState { config, compressor };

    let app = create_app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            })
            .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                info!("📥 {} {}", request.method(), request.uri());
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                },
            ),
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", port);
    info!("✅ Server ready at {}", url);
    browser::open_in_background(url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
