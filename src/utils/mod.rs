use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// 解析出的客户端标识，由限流中间件写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

pub const UNKNOWN_CLIENT: &str = "unknown";

/// 获取客户端IP
///
/// 默认使用连接信息中的对端地址；`trust_proxy_headers` 打开时，
/// 依次优先使用 `x-real-ip` 和 `x-forwarded-for` 中第一个非空地址。
pub fn resolve_client_ip<B>(req: &Request<B>, trust_proxy_headers: bool) -> String {
    // 从连接信息获取原始IP
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    let forwarded = if trust_proxy_headers {
        req.headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
    } else {
        None
    };

    forwarded
        .or(remote_ip.as_deref()) // 降级使用连接IP
        .unwrap_or(UNKNOWN_CLIENT)
        .trim()
        .to_string()
}
