use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::conversation::ConversationService;
use tower_http::trace::TraceLayer;

mod errors;
mod health;
mod origin;
mod prompt;
mod relay;

pub use origin::OriginPolicy;

#[derive(Clone)]
pub struct AppState {
    pub conversations: ConversationService,
    pub origins: OriginPolicy,
}

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/prompt", post(prompt::submit_prompt))
        .layer(middleware::from_fn_with_state(
            app_state.origins.clone(),
            origin::origin_guard,
        ))
        .layer(app_state.origins.cors_layer())
        .with_state(app_state.clone());

    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/", get(relay::relay_upgrade))
        .route("/ws", get(relay::relay_upgrade))
        .with_state(app_state);

    public_routes
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}
