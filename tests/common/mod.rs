#![allow(dead_code)]

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use axum_test::TestServer;
use shakescribe::{
    AppState,
    cache::{KvStore, MemoryStore, StoreError},
    completion::CompletionClient,
    config::{AuditLogMode, CompletionConfig, Config, StoreBackend},
    create_router,
};

pub const COMPLETIONS_PATH: &str = "/v1/completions";

/// 指向 mock 补全接口的测试配置
pub fn test_config(upstream: &mockito::ServerGuard) -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        audit_log_mode: AuditLogMode::Inline,
        trust_proxy_headers: true,
        completion: CompletionConfig {
            api_key: Some("test-key".into()),
            api_url: format!("{}{}", upstream.url(), COMPLETIONS_PATH),
            timeout_secs: 5,
            ..CompletionConfig::default()
        },
        ..Config::default()
    }
}

pub fn build_server(config: Config, store: Arc<dyn KvStore>) -> TestServer {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::level_filters::LevelFilter::DEBUG)
        .try_init();

    let completion =
        CompletionClient::new(config.completion.clone()).expect("failed to build client");
    let app = create_router(AppState::new(config, store, completion));
    TestServer::new(app).unwrap()
}

/// 收集当前线程上 `error` 级别的日志输出
#[derive(Clone, Default)]
pub struct CapturedErrors(Arc<Mutex<Vec<u8>>>);

impl CapturedErrors {
    /// 在返回的 guard 存活期间，当前线程的日志写入这里
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedErrors {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 返回固定文本的补全接口
pub async fn mock_completion(upstream: &mut mockito::ServerGuard, text: &str) -> mockito::Mock {
    upstream
        .mock("POST", COMPLETIONS_PATH)
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "choices": [{ "text": text }] }).to_string())
}

/// 可以按操作类型注入故障的存储
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_values: bool,
    pub fail_lists: bool,
}

impl FlakyStore {
    pub fn failing_values() -> Self {
        Self {
            fail_values: true,
            ..Self::default()
        }
    }

    pub fn failing_lists() -> Self {
        Self {
            fail_lists: true,
            ..Self::default()
        }
    }
}

fn refused() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_values {
            return Err(refused());
        }
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        if self.fail_values {
            return Err(refused());
        }
        self.inner.set_ex(key, value, ttl_secs).await
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<(u64, u64), StoreError> {
        self.inner.incr_window(key, window_secs).await
    }

    async fn lpush_trim(&self, key: &str, value: &str, max_len: usize) -> Result<(), StoreError> {
        if self.fail_lists {
            return Err(refused());
        }
        self.inner.lpush_trim(key, value, max_len).await
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        self.inner.lrange(key, start, stop).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_values {
            return Err(refused());
        }
        Ok(())
    }
}
