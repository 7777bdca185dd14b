use std::sync::Arc;

use crate::cache::keys::REQUEST_LOG_KEY;
use crate::cache::models::RequestLogEntry;
use crate::cache::store::{KvStore, StoreError};

/// 请求日志操作
pub struct RequestLogOperations;

impl RequestLogOperations {
    /// 记录请求，列表只保留最新的 `capacity` 条
    pub async fn log_request(
        store: &Arc<dyn KvStore>,
        entry: &RequestLogEntry,
        capacity: usize,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(entry)?;
        store.lpush_trim(REQUEST_LOG_KEY, &json, capacity).await
    }

    /// 读取最近的日志，最新的在前；无法解析的条目跳过
    pub async fn recent(
        store: &Arc<dyn KvStore>,
        limit: usize,
    ) -> Result<Vec<RequestLogEntry>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let raw = store.lrange(REQUEST_LOG_KEY, 0, limit as isize - 1).await?;
        Ok(raw
            .iter()
            .filter_map(|json| match serde_json::from_str::<RequestLogEntry>(json) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed request log entry: {}", e);
                    None
                }
            })
            .collect())
    }
}
