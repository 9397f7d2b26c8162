use std::sync::Arc;

use axum::{
    Router,
    routing::{MethodRouter, delete, get, post},
};

use crate::config::Config;
use crate::handlers::resources;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

/// Register `path` both with and without its trailing slash.
fn route_both(
    router: Router<ApiState>,
    path: &str,
    method_router: MethodRouter<ApiState>,
) -> Router<ApiState> {
    let bare = path.trim_end_matches('/');
    router
        .route(&format!("{bare}/"), method_router.clone())
        .route(bare, method_router)
}

pub fn api_router(state: ApiState) -> Router {
    let router = Router::new();
    let router = route_both(router, "/resources/", post(resources::create_database));
    let router = route_both(
        router,
        "/resources/{name}/",
        post(resources::create_user).delete(resources::drop_database),
    );
    let router = route_both(
        router,
        "/resources/{name}/hostname/{hostname}/",
        delete(resources::drop_user),
    );
    let router = route_both(router, "/resources/{name}/export/", get(resources::export));
    let router = route_both(
        router,
        "/resources/{name}/status/",
        get(resources::healthcheck),
    );
    router.with_state(state)
}
