//! Veridex Web Server
//!
//! Run with: cargo run -p veridex-web

use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use veridex_llm::config::Config;
use veridex_llm::service::AnalysisService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Veridex Web Server...");

    let config = Config::load()?;
    let api_key_configured = config.api_key_configured();
    if !api_key_configured {
        warn!(
            env_var = %config.provider.api_key_env,
            "provider API key not configured; analysis requests will fail until it is set"
        );
    }

    let backend = config.provider.build_backend()?;
    let service = AnalysisService::new(backend, &config.provider);

    let state = veridex_web::state::AppState {
        service,
        environment: config.server.environment.clone(),
        api_key_configured,
    };
    let app = veridex_web::router::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
