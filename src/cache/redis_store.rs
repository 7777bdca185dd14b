use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::OnceCell;

use super::store::{KvStore, StoreError};

/// 建立连接的超时时间
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// 单个命令等待响应的超时时间
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// 建立连接失败时不重试，请求直接返回错误；断线重连由 `ConnectionManager` 在后台进行
const CONNECT_RETRIES: usize = 0;
/// 后台重连的退避上限（毫秒），默认退避最长会到一分钟
const MAX_RECONNECT_DELAY_MS: u64 = 500;

/// 基于 Redis 的存储实现
///
/// 所有命令共用同一个 `ConnectionManager`，断线后由它自动重连。
pub struct RedisStore {
    client: RedisClient,
    connection: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// 只解析连接地址，真正的连接在第一次使用时建立
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: RedisClient::open(url)?,
            connection: OnceCell::new(),
        })
    }

    /// 连接只建立一次，之后每个命令拿到的都是它的克隆
    async fn get_connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_response_timeout(RESPONSE_TIMEOUT)
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_factor(2)
                    .set_max_delay(MAX_RECONNECT_DELAY_MS);
                ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.get_connection().await?;
        let result: Option<String> = conn.get(key).await?;
        Ok(result)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<(u64, u64), StoreError> {
        let mut conn = self.get_connection().await?;

        // 使用 Redis 的 INCR 和 EXPIRE 命令实现计数器
        let count: u64 = conn.incr(key, 1).await?;
        if count == 1 {
            // 如果是第一次请求，设置过期时间
            let _: () = conn.expire(key, window_secs as i64).await?;
            return Ok((count, window_secs));
        }

        let ttl: i64 = conn.ttl(key).await?;
        if ttl < 0 {
            // 计数器没有过期时间（上次 EXPIRE 未执行成功），补上
            let _: () = conn.expire(key, window_secs as i64).await?;
            return Ok((count, window_secs));
        }

        Ok((count, ttl as u64))
    }

    async fn lpush_trim(&self, key: &str, value: &str, max_len: usize) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let stop = max_len.max(1) as isize - 1;

        let _: () = redis::pipe()
            .atomic()
            .lpush(key, value)
            .ignore()
            .ltrim(key, 0, stop)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let mut conn = self.get_connection().await?;
        let items: Vec<String> = conn.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_rejected_up_front() {
        assert!(RedisStore::open("not a redis url").is_err());
    }

    /// 连接被拒绝时应当很快失败，而不是卡在重试退避里
    const FAIL_FAST: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn unreachable_server_is_retried_on_next_command() {
        let store = RedisStore::open("redis://127.0.0.1:1/").unwrap();

        let ping = tokio::time::timeout(FAIL_FAST, store.ping())
            .await
            .expect("ping did not fail in time");
        assert!(ping.is_err());
        assert!(store.connection.get().is_none());

        let get = tokio::time::timeout(FAIL_FAST, store.get("translate:hi"))
            .await
            .expect("get did not fail in time");
        assert!(get.is_err());
        assert!(store.connection.get().is_none());
    }

    #[tokio::test]
    async fn rate_limit_counter_fails_fast_when_server_is_down() {
        let store = RedisStore::open("redis://127.0.0.1:1/").unwrap();

        for _ in 0..2 {
            let result = tokio::time::timeout(
                FAIL_FAST,
                store.incr_window("rate_limit:1.2.3.4", 60),
            )
            .await
            .expect("incr_window did not fail in time");
            assert!(matches!(result, Err(StoreError::Redis(_))));
        }
    }
}
