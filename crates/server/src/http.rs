// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of PlexLock.
//
// PlexLock is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// PlexLock is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PlexLock. If not, see <https://www.gnu.org/licenses/>.

//! Axum handlers for the coordinator HTTP surface.
//!
//! Every response body carries a `code` field mirroring the HTTP status, so
//! callers behind proxies that rewrite statuses can still see the verdict.

use crate::duration::{format_duration, parse_duration};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use plexlock_locks::{LockError, LockManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Default TTL applied when `POST /lock` omits the `ttl` parameter.
const DEFAULT_ACQUIRE_TTL: &str = "10ms";

/// Default TTL applied when `POST /refresh` omits the `ttl` parameter.
const DEFAULT_REFRESH_TTL: &str = "10s";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The quorum engine behind this coordinator
    pub locker: Arc<dyn LockManager>,
    /// Configured replica count, reported by `/health`
    pub replica_count: usize,
}

/// Build the coordinator router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/lock", post(acquire_handler))
        .route("/unlock", post(release_handler))
        .route("/refresh", post(refresh_handler))
        .route("/ttl", get(ttl_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[derive(Deserialize)]
struct AcquireParams {
    resource: Option<String>,
    ttl: Option<String>,
}

#[derive(Deserialize)]
struct TokenParams {
    resource: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RefreshParams {
    resource: Option<String>,
    token: Option<String>,
    ttl: Option<String>,
}

#[derive(Serialize)]
struct AcquireResponse {
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
    acquired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct ReleaseResponse {
    code: u16,
    token: String,
    resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct RefreshResponse {
    code: u16,
    token: String,
    resource: String,
    ttl: String,
    refreshed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct TtlResponse {
    code: u16,
    resource: String,
    token: String,
    ttl: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    code: u16,
    status: String,
    replicas: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
}

/// Uniform 400/500 error response.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.status.as_u16(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("missing '{}' parameter", name)))
}

async fn acquire_handler(
    State(state): State<AppState>,
    Query(params): Query<AcquireParams>,
) -> Result<Response, ApiError> {
    let resource = required(params.resource, "resource")?;
    let ttl_str = params.ttl.unwrap_or_else(|| DEFAULT_ACQUIRE_TTL.to_string());
    let ttl = parse_duration(&ttl_str)
        .ok_or_else(|| ApiError::bad_request(format!("invalid 'ttl' value '{}'", ttl_str)))?;

    match state.locker.acquire(&resource, ttl).await {
        Ok(lock) => Ok((
            StatusCode::OK,
            Json(AcquireResponse {
                code: 200,
                token: Some(lock.token),
                resource: lock.resource,
                ttl: Some(format_duration(lock.ttl)),
                acquired: true,
                message: None,
            }),
        )
            .into_response()),
        Err(err @ LockError::Conflict(_)) => Ok((
            StatusCode::CONFLICT,
            Json(AcquireResponse {
                code: 409,
                token: None,
                resource,
                ttl: None,
                acquired: false,
                message: Some(err.to_string()),
            }),
        )
            .into_response()),
        Err(LockError::InvalidRequest(message)) => Err(ApiError::bad_request(message)),
        Err(err) => {
            error!(resource = %resource, %err, "acquire failed");
            Err(ApiError::internal("internal error while acquiring lock"))
        }
    }
}

async fn release_handler(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> Result<Response, ApiError> {
    let resource = required(params.resource, "resource")?;
    let token = required(params.token, "token")?;

    match state.locker.release(&resource, &token).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(ReleaseResponse {
                code: 200,
                token,
                resource,
                message: None,
            }),
        )
            .into_response()),
        Err(LockError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Json(ReleaseResponse {
                code: 404,
                token,
                resource,
                message: Some("lock not found or expired".to_string()),
            }),
        )
            .into_response()),
        Err(LockError::InvalidRequest(message)) => Err(ApiError::bad_request(message)),
        Err(err) => {
            error!(resource = %resource, %err, "release failed");
            Err(ApiError::internal("internal error while releasing lock"))
        }
    }
}

async fn refresh_handler(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<Response, ApiError> {
    let resource = required(params.resource, "resource")?;
    let token = required(params.token, "token")?;
    let ttl_str = params.ttl.unwrap_or_else(|| DEFAULT_REFRESH_TTL.to_string());
    let ttl = parse_duration(&ttl_str)
        .ok_or_else(|| ApiError::bad_request(format!("invalid 'ttl' value '{}'", ttl_str)))?;

    match state.locker.refresh(&resource, &token, ttl).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(RefreshResponse {
                code: 200,
                token,
                resource,
                ttl: format_duration(ttl),
                refreshed: true,
                message: None,
            }),
        )
            .into_response()),
        Err(err @ LockError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Json(RefreshResponse {
                code: 404,
                token,
                resource,
                ttl: format_duration(ttl),
                refreshed: false,
                message: Some(err.to_string()),
            }),
        )
            .into_response()),
        Err(LockError::InvalidRequest(message)) => Err(ApiError::bad_request(message)),
        Err(err) => {
            error!(resource = %resource, %err, "refresh failed");
            Err(ApiError::internal("internal error while refreshing lock"))
        }
    }
}

async fn ttl_handler(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> Result<Response, ApiError> {
    let resource = required(params.resource, "resource")?;
    let token = required(params.token, "token")?;

    match state.locker.ttl(&resource, &token).await {
        Ok(remaining) => Ok((
            StatusCode::OK,
            Json(TtlResponse {
                code: 200,
                resource,
                token,
                ttl: format_duration(remaining),
                message: None,
            }),
        )
            .into_response()),
        Err(LockError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Json(TtlResponse {
                code: 404,
                resource,
                token,
                ttl: "0s".to_string(),
                message: Some("lock not found or expired".to_string()),
            }),
        )
            .into_response()),
        Err(LockError::InvalidRequest(message)) => Err(ApiError::bad_request(message)),
        Err(err) => {
            error!(resource = %resource, %err, "ttl check failed");
            Err(ApiError::internal("internal error while checking TTL"))
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            code: 200,
            status: "ok".to_string(),
            replicas: state.replica_count,
        }),
    )
        .into_response()
}
