use std::sync::Arc;

use crate::cache::keys::rate_limit_key;
use crate::cache::models::RateLimitStatus;
use crate::cache::store::{KvStore, StoreError};

/// 速率限制缓存操作
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// 记录一次请求并返回当前窗口的限流状态
    pub async fn record_hit(
        store: &Arc<dyn KvStore>,
        client: &str,
        window_secs: u64,
        limit: u32,
    ) -> Result<RateLimitStatus, StoreError> {
        let (count, reset_after_secs) = store
            .incr_window(&rate_limit_key(client), window_secs)
            .await?;

        Ok(RateLimitStatus {
            count,
            limit,
            reset_after_secs,
        })
    }
}
