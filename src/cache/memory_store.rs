//! 进程内存储，用于本地开发和测试
//!
//! 过期时间以 tokio 时钟计算，测试中可以用 `tokio::time::pause` 控制。

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::store::{KvStore, StoreError};

/// 两次全表清理过期条目之间的最小间隔
const PURGE_INTERVAL: Duration = Duration::from_secs(1);

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Entry>,
    lists: HashMap<String, VecDeque<String>>,
    last_purge: Option<Instant>,
}

impl Inner {
    /// 写入前清掉所有过期条目，间隔不足 `PURGE_INTERVAL` 时跳过
    fn purge_expired(&mut self, now: Instant) {
        if self
            .last_purge
            .is_some_and(|last| now.saturating_duration_since(last) < PURGE_INTERVAL)
        {
            return;
        }
        self.values.retain(|_, entry| entry.is_live(now));
        self.last_purge = Some(now);
    }

    fn insert(&mut self, key: &str, value: String, ttl_secs: u64, now: Instant) {
        self.purge_expired(now);
        self.values.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + Duration::from_secs(ttl_secs),
            },
        );
    }

    /// 读取未过期的条目，过期条目顺便删除
    fn live_entry(&mut self, key: &str, now: Instant) -> Option<&mut Entry> {
        let expired = self
            .values
            .get(key)
            .is_some_and(|entry| !entry.is_live(now));
        if expired {
            self.values.remove(key);
        }
        self.values.get_mut(key)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 剩余秒数向上取整
fn remaining_secs(expires_at: Instant, now: Instant) -> u64 {
    let remaining = expires_at.saturating_duration_since(now);
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 { secs + 1 } else { secs }
}

/// 把 Redis 风格的下标（可为负数）换算成区间
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        Ok(inner.live_entry(key, now).map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let now = Instant::now();
        self.inner
            .lock()
            .insert(key, value.to_string(), ttl_secs, now);
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<(u64, u64), StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.live_entry(key, now) {
            let count = entry
                .value
                .parse::<u64>()
                .map_err(|_| StoreError::WrongType(key.to_string()))?
                + 1;
            entry.value = count.to_string();
            return Ok((count, remaining_secs(entry.expires_at, now)));
        }

        inner.insert(key, "1".to_string(), window_secs, now);
        Ok((1, window_secs))
    }

    async fn lpush_trim(&self, key: &str, value: &str, max_len: usize) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let list = inner.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        list.truncate(max_len.max(1));
        Ok(())
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock();
        let Some(list) = inner.lists.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = resolve_range(list.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(list
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
