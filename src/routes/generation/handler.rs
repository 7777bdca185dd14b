use axum::{
    Json,
    body::Bytes,
    extract::{Extension, State},
    http::{HeaderMap, header},
    response::Response,
};
use serde::de::DeserializeOwned;

use super::model::{Generation, SonnetRequest, TranslateRequest};
use crate::AppState;
use crate::error::AppError;
use crate::utils::ClientIp;

/// 是否为 application/json 或 application/*+json
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// 非 JSON 或空的请求体视为字段缺失，其余解析错误原样返回
fn field_from<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &Bytes,
    field: impl FnOnce(T) -> Option<String>,
) -> Result<Option<String>, AppError> {
    if !is_json_content_type(headers) || body.trim_ascii().is_empty() {
        return Ok(None);
    }
    match Json::<T>::from_bytes(body) {
        Ok(Json(req)) => Ok(field(req)),
        Err(rejection) => Err(AppError::InvalidBody(rejection.body_text())),
    }
}

#[axum::debug_handler]
pub async fn translate(
    State(state): State<AppState>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let text = field_from(&headers, &body, |req: TranslateRequest| req.text)?;
    Generation::Translate.run(&state, &client_ip, text).await
}

#[axum::debug_handler]
pub async fn sonnet(
    State(state): State<AppState>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let topic = field_from(&headers, &body, |req: SonnetRequest| req.topic)?;
    Generation::Sonnet.run(&state, &client_ip, topic).await
}
