/// 一次限流计数后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub count: u64,
    pub limit: u32,
    /// 窗口重置前的剩余秒数
    pub reset_after_secs: u64,
}

impl RateLimitStatus {
    pub fn exceeded(&self) -> bool {
        self.count > u64::from(self.limit)
    }

    pub fn remaining(&self) -> u64 {
        u64::from(self.limit).saturating_sub(self.count)
    }
}
