/// 缓存操作
/// 提供缓存操作的功能实现

// 生成结果缓存
pub mod result;

// 请求日志
pub mod request_log;

pub mod rate_limit;

// 重新导出常用操作
pub use rate_limit::RateLimitCacheOperations;
pub use request_log::RequestLogOperations;
pub use result::ResultCacheOperations;
