use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

// 公开路由，不限流
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(routes::root::welcome))
        .route("/health", get(routes::root::health))
}

// 生成相关的路由，按客户端限流
fn generation_routes(limiter: Arc<RateLimiter>) -> Router<AppState> {
    Router::new()
        .route("/translate", post(routes::generation::translate))
        .route("/sonnet", post(routes::generation::sonnet))
        .route_layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let limiter = Arc::new(RateLimiter::new(
        state.store.clone(),
        state.config.clone(),
    ));

    let api = Router::new()
        .merge(public_routes())
        .merge(generation_routes(limiter));

    // 根路径不能 nest，只有配置了前缀时才嵌套
    let base_uri = state.config.api_base_uri.clone();
    let router = if base_uri.is_empty() {
        api
    } else {
        Router::new().nest(&base_uri, api)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(log_errors)),
        )
        .with_state(state)
}
