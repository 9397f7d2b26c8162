use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::params::RequestParams;
use crate::router::ApiState;
use crate::service::manager::DatabaseManager;
use crate::types::credentials::{DatabaseEnv, UserEnv};

/// POST /resources/ -> provision a schema.
pub async fn create_database(
    State(state): State<ApiState>,
    params: RequestParams,
) -> Result<Response, ApiError> {
    let name = params.required("name", ApiError::MissingName, ApiError::EmptyName)?;
    let db = DatabaseManager::new(name, params.service_host(), &state.config);
    db.create_database().await?;

    let credential = db.credential(state.config.public_host(params.explicit_service_host()));
    Ok((StatusCode::CREATED, Json(DatabaseEnv::from(credential))).into_response())
}

/// POST /resources/{name}/ -> mint an account bound to the schema.
pub async fn create_user(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    params: RequestParams,
) -> Result<Response, ApiError> {
    let hostname = params.required(
        "hostname",
        ApiError::MissingHostname,
        ApiError::EmptyHostname,
    )?;
    let db = DatabaseManager::new(name.as_str(), params.service_host(), &state.config);
    let credential = db.create_user(&name, hostname).await?;
    Ok((StatusCode::CREATED, Json(UserEnv::from(credential))).into_response())
}

/// DELETE /resources/{name}/
pub async fn drop_database(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    params: RequestParams,
) -> Result<StatusCode, ApiError> {
    DatabaseManager::new(name, params.service_host(), &state.config)
        .drop_database()
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /resources/{name}/hostname/{hostname}/
pub async fn drop_user(
    State(state): State<ApiState>,
    Path((name, hostname)): Path<(String, String)>,
    params: RequestParams,
) -> Result<StatusCode, ApiError> {
    DatabaseManager::new(name.as_str(), params.service_host(), &state.config)
        .drop_user(&name, &hostname)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /resources/{name}/export/ -> schema dump as plain text.
pub async fn export(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    params: RequestParams,
) -> Result<Response, ApiError> {
    let dump = DatabaseManager::new(name, params.service_host(), &state.config)
        .export()
        .await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        dump,
    )
        .into_response())
}

/// GET /resources/{name}/status/ -> 204 when the server accepts a session.
pub async fn healthcheck(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    params: RequestParams,
) -> Response {
    let db = DatabaseManager::new(name, params.service_host(), &state.config);
    if db.is_up().await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        warn!(database = %db.name(), host = %db.host(), "healthcheck failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("MySQL server at {} is unreachable", db.host()),
        )
            .into_response()
    }
}
