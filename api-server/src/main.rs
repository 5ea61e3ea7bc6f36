use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use advisor::{build_provider, DecisionProvider, LlmConfig};

mod frontend;
mod mcp;
mod routes;
mod settings;

use settings::ServerSettings;

/// Read-only state shared by every worker
pub struct AppState {
    pub provider: Arc<dyn DecisionProvider>,
    pub frontend_dist: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting AI Pong Arena server");

    let settings = ServerSettings::from_env();
    let provider = build_provider(&LlmConfig::from_env());
    tracing::info!("Decision provider: {}", provider.name());

    if !settings.frontend_dist.join("index.html").is_file() {
        tracing::warn!(
            "No frontend build at {}, serving build instructions instead",
            settings.frontend_dist.display()
        );
    }

    let state = web::Data::new(AppState {
        provider,
        frontend_dist: settings.frontend_dist.clone(),
    });

    tracing::info!("Binding to {}", settings.bind);

    HttpServer::new(move || {
        // Configure CORS to allow all origins
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
            .max_age(86400);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(|cfg| routes::configure(cfg, state))
    })
    .bind(&settings.bind)?
    .run()
    .await
}
