// 缓存模块
// 包含存储抽象、缓存键、缓存数据结构和操作逻辑

pub mod keys;
pub mod memory_store;
pub mod models;
pub mod operations;
pub mod redis_store;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use memory_store::MemoryStore;
pub use models::{RateLimitStatus, RequestLogEntry};
pub use operations::{RateLimitCacheOperations, RequestLogOperations, ResultCacheOperations};
pub use redis_store::RedisStore;
pub use store::{KvStore, StoreError};
