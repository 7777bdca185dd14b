/// 缓存数据模型
/// 定义存储中数据的结构体
pub mod rate_limit;
pub mod request_log;

pub use rate_limit::RateLimitStatus;
pub use request_log::RequestLogEntry;
