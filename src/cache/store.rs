use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Value at key '{0}' has the wrong type")]
    WrongType(String),
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 键值存储抽象
///
/// 覆盖服务用到的全部共享状态：结果缓存、限流计数和请求日志。
/// 每个方法都对应一次原子的存储操作，调用方不做额外加锁。
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取字符串值，不存在或已过期时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入字符串值并设置过期秒数
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// 计数器加一；窗口内第一次计数时设置过期时间。
    /// 返回 (当前计数, 窗口剩余秒数)
    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<(u64, u64), StoreError>;

    /// 插入到列表头部，并只保留最新的 `max_len` 条
    async fn lpush_trim(&self, key: &str, value: &str, max_len: usize) -> Result<(), StoreError>;

    /// 读取列表区间，语义同 Redis `LRANGE`（含两端，支持负下标）
    async fn lrange(&self, key: &str, start: isize, stop: isize)
        -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
