use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use marathon_server::config::Config;
use marathon_server::routes::create_routes;
use marathon_server::state::AppState;
use marathon_server::utils::error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marathon_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let state = AppState::from_config(&config);
    tracing::info!(flow = ?config.registration_flow, "Default registration flow");

    state.sessions.spawn_sweeper(config.session_ttl);
    tracing::info!(
        ttl_secs = config.session_ttl.as_secs(),
        "Idle registration sessions will expire"
    );

    let app = create_routes(state, &config);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("🚀 Server running at http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Server failed: {}", e)))
}
