use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 慢路径计数器
///
/// 只在临界区内更新，快路径不触碰任何计数器。
#[derive(Debug, Default)]
pub struct HolderStats {
    constructions: AtomicU64,
    slow_path_entries: AtomicU64,
    lost_races: AtomicU64,
    failed_constructions: AtomicU64,
}

/// 计数器的只读快照
///
/// 每次进入慢路径恰好得到一个结果：
/// `slow_path_entries == constructions + lost_races + failed_constructions`。
/// 构造闭包 panic 也计入 `failed_constructions`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub constructions: u64,
    pub slow_path_entries: u64,
    pub lost_races: u64,
    pub failed_constructions: u64,
}

impl HolderStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_slow_path(&self) {
        self.slow_path_entries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_construction(&self) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_lost_race(&self) {
        self.lost_races.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failed_constructions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            constructions: self.constructions.load(Ordering::Relaxed),
            slow_path_entries: self.slow_path_entries.load(Ordering::Relaxed),
            lost_races: self.lost_races.load(Ordering::Relaxed),
            failed_constructions: self.failed_constructions.load(Ordering::Relaxed),
        }
    }
}
