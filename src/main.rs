use clap::Parser;
use dotenvy::dotenv;
use rust_file_drop::config::{DropConfig, StoreBackend};
use rust_file_drop::infrastructure::setup_store;
use rust_file_drop::services::access_code::AccessCodeGenerator;
use rust_file_drop::services::drop_service::DropService;
use rust_file_drop::services::worker::ReaperWorker;
use rust_file_drop::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ephemeral, access-controlled file drop
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Keep records in memory instead of sqlite
    #[arg(long, conflicts_with = "production")]
    memory: bool,

    /// Start from the development preset instead of the environment
    #[arg(long, conflicts_with = "production")]
    development: bool,

    /// Apply the production preset (sqlite, hidden foreign records, salt required)
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing with EnvFilter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_file_drop=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("🚀 Starting Rust File Drop...");

    let mut config = if cli.development {
        DropConfig::development()
    } else if cli.production {
        DropConfig::production()?
    } else {
        DropConfig::from_env()
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if cli.memory {
        config.store_backend = StoreBackend::Memory;
    }

    let codes = AccessCodeGenerator::new(config.access_code_length);
    info!(
        "🛡️  Drop Config: Identity={}, Retention={}s, Max Size={}MB, Code Length={} ({:.1} bits)",
        config.identity_mode,
        config.retention_secs,
        config.max_file_size / 1024 / 1024,
        codes.length(),
        codes.entropy_bits()
    );
    if config.uses_default_salt() {
        warn!("⚠️  IDENTITY_SALT is not set, using the development salt");
    }

    let store = setup_store(&config).await?;
    let service = Arc::new(DropService::from_config(store, &config)?);

    // Setup Shutdown Channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    if config.reap_interval_secs > 0 {
        let worker = ReaperWorker::new(
            service.clone(),
            Duration::from_secs(config.reap_interval_secs),
            shutdown_rx,
        );
        tokio::spawn(async move {
            worker.run().await;
        });
    }

    let state = AppState {
        service,
        config: config.clone(),
    };

    let app = create_app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
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

    let addr: SocketAddr = config.bind_addr.parse()?;
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
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
