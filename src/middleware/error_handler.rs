use axum::{
    body::{Body, to_bytes},
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

/// 记录日志时读取的错误响应体上限
const MAX_LOGGED_BODY: usize = 16 * 1024;
/// 响应体超过上限时返回给客户端的内容
const OVERSIZED_BODY_DETAIL: &str = r#"{"detail":"Internal server error"}"#;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(b) => b,
            Err(e) => {
                error!(
                    %method,
                    %uri,
                    "Server error occurred - Status: {}, failed to read body: {}",
                    parts.status, e
                );
                // 原响应体已被部分读取，只能换成固定内容
                parts.headers.remove(header::CONTENT_LENGTH);
                parts.headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                return Response::from_parts(parts, Body::from(OVERSIZED_BODY_DETAIL));
            }
        };
        let body_str = String::from_utf8_lossy(&bytes);

        error!(
            %method,
            %uri,
            "Server error occurred - Status: {}, Body: {}",
            parts.status, body_str
        );

        // 重置body以便重新构建响应
        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
