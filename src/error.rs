use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::StoreError;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    /// 必填字段缺失或为空，字段名首字母大写，例如 "Text"
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidBody(String),
    #[error("Rate limit exceeded. Maximum {max} requests per day.")]
    RateLimited { max: u32 },
    #[error("Completion API key not configured")]
    MissingApiKey,
    #[error("Completion API error: {0}")]
    Upstream(String),
    #[error("Completion API request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Completion API returned no choices")]
    EmptyCompletion,
    #[error("Completion API timed out after {0}s")]
    UpstreamTimeout(u64),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    detail: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::MissingApiKey
            | AppError::Upstream(_)
            | AppError::Transport(_)
            | AppError::EmptyCompletion
            | AppError::Store(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 只有限流响应在 body 中带 status 字段
        let body = Json(ErrorResponse {
            status: matches!(self, AppError::RateLimited { .. }).then(|| status.as_u16()),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}
