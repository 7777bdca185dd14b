use std::sync::Arc;

use crate::cache::store::{KvStore, StoreError};

/// 生成结果缓存操作
///
/// 缓存值是完整的 JSON 响应体，命中时原样返回。
pub struct ResultCacheOperations;

impl ResultCacheOperations {
    /// 获取缓存的响应体
    pub async fn get_cached(
        store: &Arc<dyn KvStore>,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let cached = store.get(key).await?;
        match &cached {
            Some(_) => tracing::debug!(key, "result cache hit"),
            None => tracing::debug!(key, "result cache miss"),
        }
        Ok(cached)
    }

    /// 写入响应体并设置过期时间
    pub async fn store(
        store: &Arc<dyn KvStore>,
        key: &str,
        payload: &str,
        ttl: u64,
    ) -> Result<(), StoreError> {
        store.set_ex(key, payload, ttl).await
    }
}
