use actix_files::Files;
use actix_web::{error, web, HttpRequest, HttpResponse, Responder};
use arena_core::{GameSnapshot, SnapshotPayload, Violation};
use serde::Serialize;

use crate::{frontend, mcp, AppState};

// Snapshots are a handful of fields
const JSON_LIMIT: usize = 16 * 1024;

/// Body returned when a request cannot be turned into a game snapshot
#[derive(Debug, Serialize)]
struct ValidationFailure {
    success: bool,
    error: String,
    violations: Vec<Violation>,
}

impl ValidationFailure {
    fn new(violations: Vec<Violation>) -> Self {
        Self {
            success: false,
            error: "invalid game snapshot".to_string(),
            violations,
        }
    }
}

/// Register every route of the arena on an app or test service.
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let assets_dir = state.frontend_dist.join("assets");

    cfg.app_data(state)
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_LIMIT)
                .error_handler(json_error_handler),
        )
        .route("/health", web::get().to(health))
        .route("/ai-move", web::post().to(ai_move))
        .route("/mcp", web::post().to(mcp::endpoint))
        .route("/mcp/", web::post().to(mcp::endpoint));

    if assets_dir.is_dir() {
        cfg.service(Files::new("/assets", assets_dir));
    }

    cfg.route("/", web::get().to(frontend::index));
}

/// Malformed bodies get the same 422 shape as out-of-range fields.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    tracing::info!("Rejected /ai-move body: {}", err);
    let body = ValidationFailure::new(vec![Violation::new("body", err.to_string())]);
    error::InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(body)).into()
}

/// POST /ai-move
/// Decide the AI paddle's next move for a game snapshot
async fn ai_move(
    state: web::Data<AppState>,
    payload: web::Json<SnapshotPayload>,
) -> HttpResponse {
    let snapshot = match GameSnapshot::try_from(payload.into_inner()) {
        Ok(snapshot) => snapshot,
        Err(errors) => {
            tracing::info!("Rejected snapshot: {}", errors);
            return HttpResponse::UnprocessableEntity().json(ValidationFailure::new(errors.0));
        }
    };

    tracing::debug!(
        "AI move requested: score {}-{}, rally {}, pattern {}, speed {}, difficulty {}",
        snapshot.player_score(),
        snapshot.ai_score(),
        snapshot.rally_length(),
        snapshot.player_hit_pattern(),
        snapshot.ball_speed(),
        snapshot.difficulty()
    );

    let response = state.provider.decide(&snapshot).await;
    HttpResponse::Ok().json(response)
}

/// GET /health
/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
