use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, with_security_headers, Config};
use crate::handlers::registrations::{
    create_session, delete_session, get_session, go_to_step, merge_form_responses, next_step,
    prev_step, replace_form_responses, reset_session, update_selection,
};
use crate::handlers::tickets::{check_access, quote_ticket};
use crate::handlers::health_check;
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/tickets/quote", post(quote_ticket))
        .route("/tickets/access", post(check_access))
        .route("/registrations", post(create_session))
        .route("/registrations/:id", get(get_session).delete(delete_session))
        .route("/registrations/:id/next", post(next_step))
        .route("/registrations/:id/prev", post(prev_step))
        .route("/registrations/:id/goto", post(go_to_step))
        .route("/registrations/:id/reset", post(reset_session))
        .route("/registrations/:id/selection", put(update_selection))
        .route(
            "/registrations/:id/responses",
            put(replace_form_responses).patch(merge_form_responses),
        )
        .with_state(state);

    with_security_headers(router, config.production)
        .layer(create_cors_layer(config))
        .layer(TraceLayer::new_for_http())
}
