use bangla_transcribe::config::TranscribeConfig;
use bangla_transcribe::infrastructure::{recognizer, refiner, upload_dir};
use bangla_transcribe::services::transcription_service::TranscriptionService;
use bangla_transcribe::{AppState, create_app};
use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the HTTP server
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bangla_transcribe=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Bangla Transcribe...");

    let config = TranscribeConfig::from_env();
    info!(
        "🛡️  Upload Config: Max Size={}MB, Allowed={:?}, Dir={}",
        config.max_file_size / 1024 / 1024,
        bangla_transcribe::utils::validation::ALLOWED_EXTENSIONS,
        config.upload_dir.display()
    );

    // 2. Collaborators
    upload_dir::setup_upload_dir(&config.upload_dir).await?;
    let speech_recognizer = recognizer::setup_recognizer(&config).await;
    let text_refiner = refiner::setup_refiner(&config);

    if speech_recognizer.is_none() {
        error!("❌ No speech recognizer available. Transcription requests will be rejected.");
    }

    let transcription_service = Arc::new(TranscriptionService::new(
        speech_recognizer,
        text_refiner,
        &config,
    ));

    let state = AppState {
        transcription_service,
        config,
    };

    // 3. HTTP server
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
