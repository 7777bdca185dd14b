use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 默认补全接口地址
pub const DEFAULT_COMPLETION_API_URL: &str = "https://api.together.xyz/v1/completions";
/// 默认补全模型
pub const DEFAULT_COMPLETION_MODEL: &str = "deepseek-llm/deepseek-coder-33b-instruct";

/// 键值存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// 审计日志写入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLogMode {
    /// 后台任务写入，失败只记录告警
    Background,
    /// 在请求中等待写入完成，失败即请求失败
    Inline,
}

impl FromStr for AuditLogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(AuditLogMode::Background),
            "inline" => Ok(AuditLogMode::Inline),
            other => Err(format!("unknown audit log mode '{}'", other)),
        }
    }
}

/// 补全接口配置
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_COMPLETION_API_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub completion: CompletionConfig,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub cache_ttl_secs: u64,
    pub request_log_capacity: usize,
    pub audit_log_mode: AuditLogMode,
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            api_base_uri: String::new(),
            store_backend: StoreBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            completion: CompletionConfig::default(),
            rate_limit_window_secs: 24 * 60 * 60,
            rate_limit_requests: 10,
            cache_ttl_secs: 7 * 86400,
            request_log_capacity: 1000,
            audit_log_mode: AuditLogMode::Background,
            trust_proxy_headers: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 从任意键值来源读取配置，未设置的变量使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let completion_defaults = defaults.completion.clone();

        // 兼容旧的 DEEPSEEK_API_KEY
        let api_key = lookup("COMPLETION_API_KEY")
            .or_else(|| lookup("DEEPSEEK_API_KEY"))
            .filter(|key| !key.trim().is_empty());

        let completion = CompletionConfig {
            api_key,
            api_url: lookup("COMPLETION_API_URL").unwrap_or(completion_defaults.api_url),
            model: lookup("COMPLETION_MODEL").unwrap_or(completion_defaults.model),
            max_tokens: parse_var(
                &lookup,
                "COMPLETION_MAX_TOKENS",
                completion_defaults.max_tokens,
            )?,
            temperature: parse_var(
                &lookup,
                "COMPLETION_TEMPERATURE",
                completion_defaults.temperature,
            )?,
            top_p: parse_var(&lookup, "COMPLETION_TOP_P", completion_defaults.top_p)?,
            timeout_secs: parse_secs(
                &lookup,
                "COMPLETION_TIMEOUT_SECS",
                completion_defaults.timeout_secs,
            )?,
        };

        Ok(Config {
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var(&lookup, "PORT", defaults.server_port)?,
            api_base_uri: normalize_base_uri(&lookup("API_BASE_URI").unwrap_or_default()),
            store_backend: parse_var(&lookup, "STORE_BACKEND", defaults.store_backend)?,
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            completion,
            rate_limit_window_secs: parse_secs(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            )?,
            rate_limit_requests: parse_var(
                &lookup,
                "MAX_REQUESTS_PER_DAY",
                defaults.rate_limit_requests,
            )?,
            cache_ttl_secs: parse_secs(&lookup, "CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            request_log_capacity: parse_var(
                &lookup,
                "REQUEST_LOG_CAPACITY",
                defaults.request_log_capacity,
            )?,
            audit_log_mode: parse_var(&lookup, "AUDIT_LOG_MODE", defaults.audit_log_mode)?,
            trust_proxy_headers: parse_var(
                &lookup,
                "TRUST_PROXY_HEADERS",
                defaults.trust_proxy_headers,
            )?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

/// 过期时间和超时必须大于零：Redis 拒绝 `EX 0`，零超时会让每次调用都失败
fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_var(lookup, name, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: secs.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

/// 统一成 "/api" 这种形式，空字符串表示挂在根路径
fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
