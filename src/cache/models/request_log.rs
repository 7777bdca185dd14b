use serde::{Deserialize, Serialize};

/// 请求日志条目，写入后不再修改
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RequestLogEntry {
    /// Unix 时间戳（毫秒）
    pub timestamp: i64,
    #[serde(rename = "ip")]
    pub client_address: String,
    pub endpoint: String,
    #[serde(rename = "request")]
    pub request_payload: serde_json::Value,
}

impl RequestLogEntry {
    pub fn new(client_address: &str, endpoint: &str, request_payload: serde_json::Value) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_address: client_address.to_string(),
            endpoint: endpoint.to_string(),
            request_payload,
        }
    }
}
