use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use menu_shared::config::LimitSettings;

use crate::handlers::{health, menu_items, menus};
use crate::state::AppState;

pub fn build_router(state: AppState, limits: &LimitSettings) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let menu_routes = Router::new()
        .route("/api/menus/", get(menus::list_menus).post(menus::create_menu))
        .route("/api/menu/{menu_id}/", get(menus::get_menu))
        .route("/api/menu/{menu_id}/update/", post(menus::update_menu))
        .route("/api/menu/{menu_id}/delete/", post(menus::delete_menu))
        .route("/api/menu/{menu_id}/items/", get(menu_items::list_items))
        .route("/api/menu/{menu_id}/save/", post(menu_items::save_structure))
        .route("/api/menu/{menu_id}/item/create/", post(menu_items::create_item))
        .route("/api/item/{item_id}/delete/", post(menu_items::delete_item));

    Router::new()
        .merge(public_routes)
        .merge(menu_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
}
