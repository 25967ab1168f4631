use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zelo_backend::domain::{ElderService, IntakeService, MedicationService};
use zelo_backend::io::{router, AppState};
use zelo_backend::speech::{DisabledSpeech, GeminiTts, SpeechSynthesizer};
use zelo_backend::CsvConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Opening data directory");
    let conn = Arc::new(CsvConnection::new_default()?);

    let state = AppState {
        elder_service: ElderService::new(conn.clone()),
        medication_service: MedicationService::new(conn.clone()),
        intake_service: IntakeService::new(conn),
        speech: match GeminiTts::from_env() {
            Some(tts) => Arc::new(tts) as Arc<dyn SpeechSynthesizer>,
            None => {
                info!("GEMINI_API_KEY not set, speech synthesis disabled");
                Arc::new(DisabledSpeech)
            }
        },
    };

    // CORS setup to allow a browser frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new().nest("/api", router(state)).layer(cors);

    let port: u16 = std::env::var("ZELO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
