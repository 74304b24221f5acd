//! Double-checked lazy holder
//!
//! `LazyHolder<T>` 在第一次请求时构造唯一的 `T`，之后所有调用都返回同一个
//! `Arc<T>`。已发布的引用存放在 `ArcSwapOption` 中，读取不需要加锁；
//! 只有槽位为空时才进入由互斥锁保护的临界区，并在锁内再次检查。

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::events::{HolderEvent, HolderObserver};
use super::stats::{HolderStats, StatsSnapshot};

/// 惰性单例持有器
///
/// 状态只有两种：未构造、已构造。转换是单向的，已发布的值不会被替换。
/// 构造闭包 panic 时槽位保持为空（`parking_lot::Mutex` 不会中毒），
/// 这次尝试记为一次失败，后续调用可以重新尝试构造。
pub struct LazyHolder<T> {
    slot: ArcSwapOption<T>,
    init_lock: Mutex<()>,
    stats: HolderStats,
    observer: Option<HolderObserver>,
}

impl<T> LazyHolder<T> {
    /// 创建一个空的持有器
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
            stats: HolderStats::new(),
            observer: None,
        }
    }

    /// 注册慢路径事件观察者
    pub fn with_observer(mut self, observer: HolderObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 获取已发布的实例，不会触发构造
    #[inline]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.slot.load().is_some()
    }

    /// 获取实例，必要时用 `init` 构造
    ///
    /// `init` 只在本次调用真正执行构造时被调用；否则直接丢弃。
    pub fn get_or_init<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// 获取实例，必要时用可能失败的 `init` 构造
    ///
    /// 构造失败时错误只返回给本次调用者，槽位保持为空。
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        // 第一次检查（无锁）
        if let Some(value) = self.slot.load_full() {
            return Ok(value);
        }
        self.init_slow(init)
    }

    #[cold]
    fn init_slow<F, E>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        let (outcome, event) = {
            let _guard = self.init_lock.lock();
            self.stats.record_slow_path();

            // 第二次检查：等待锁期间其他线程可能已经完成构造
            if let Some(existing) = self.slot.load_full() {
                self.stats.record_lost_race();
                (Ok(existing), HolderEvent::LostRace)
            } else {
                let unwind = FailureOnUnwind {
                    stats: &self.stats,
                    type_name: std::any::type_name::<T>(),
                };
                let result = init();
                std::mem::forget(unwind);

                match result {
                    Ok(value) => {
                        let value = Arc::new(value);
                        // 发布必须在释放锁之前完成
                        self.slot.store(Some(Arc::clone(&value)));
                        self.stats.record_construction();
                        (Ok(value), HolderEvent::Constructed)
                    }
                    Err(err) => {
                        self.stats.record_failure();
                        let reason = err.to_string();
                        (Err(err), HolderEvent::ConstructionFailed { reason })
                    }
                }
            }
        };

        match &event {
            HolderEvent::Constructed => {
                debug!("Constructed lazy instance of {}", std::any::type_name::<T>());
            }
            HolderEvent::LostRace => {
                trace!("Instance already constructed by another thread");
            }
            HolderEvent::ConstructionFailed { reason } => {
                warn!(
                    "Failed to construct {}: {}",
                    std::any::type_name::<T>(),
                    reason
                );
            }
        }
        self.emit(&event);

        outcome
    }

    fn emit(&self, event: &HolderEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    /// 获取慢路径统计快照
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// 只在构造闭包 panic 展开时被 drop
struct FailureOnUnwind<'a> {
    stats: &'a HolderStats,
    type_name: &'static str,
}

impl Drop for FailureOnUnwind<'_> {
    fn drop(&mut self) {
        self.stats.record_failure();
        warn!("Construction of {} panicked", self.type_name);
    }
}

impl<T> Default for LazyHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyHolder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyHolder")
            .field("value", &self.slot.load().as_deref())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_holder() {
        let holder: LazyHolder<String> = LazyHolder::new();
        assert!(!holder.is_initialized());
        assert!(holder.get().is_none());
        assert_eq!(holder.stats(), StatsSnapshot::default());
    }

    #[test]
    fn test_init_runs_once() {
        let holder = LazyHolder::new();
        let calls = AtomicUsize::new(0);

        let first = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "first".to_string()
        });
        let second = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "second".to_string()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, "first");
        assert!(holder.is_initialized());
    }

    #[test]
    fn test_fast_path_skips_slow_path_counters() {
        let holder = LazyHolder::new();
        holder.get_or_init(|| 1u32);
        for _ in 0..10 {
            holder.get_or_init(|| 2u32);
        }

        let stats = holder.stats();
        assert_eq!(stats.constructions, 1);
        assert_eq!(stats.slow_path_entries, 1);
        assert_eq!(stats.lost_races, 0);
    }

    #[test]
    fn test_failed_init_leaves_slot_empty() {
        let holder: LazyHolder<u32> = LazyHolder::new();

        let result = holder.get_or_try_init(|| Err::<u32, String>("boom".to_string()));
        assert_eq!(result.unwrap_err(), "boom");
        assert!(!holder.is_initialized());

        let value = holder.get_or_try_init(|| Ok::<u32, String>(7)).unwrap();
        assert_eq!(*value, 7);

        let stats = holder.stats();
        assert_eq!(stats.failed_constructions, 1);
        assert_eq!(stats.constructions, 1);
    }

    #[test]
    fn test_observer_receives_events() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let observer: HolderObserver = Arc::new(move |event: &HolderEvent| {
            sink.lock().push(event.clone());
        });
        let holder: LazyHolder<u32> = LazyHolder::new().with_observer(observer);

        let _ = holder.get_or_try_init(|| Err::<u32, &str>("invalid"));
        holder.get_or_init(|| 1);
        holder.get_or_init(|| 2);

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                HolderEvent::ConstructionFailed {
                    reason: "invalid".to_string()
                },
                HolderEvent::Constructed,
            ]
        );
    }

    #[test]
    fn test_observer_may_reenter_holder() {
        let seen = Arc::new(AtomicUsize::new(0));
        let holder = Arc::new(std::sync::OnceLock::<LazyHolder<u32>>::new());

        let seen_in_observer = Arc::clone(&seen);
        let holder_in_observer = Arc::clone(&holder);
        let lazy = LazyHolder::new().with_observer(Arc::new(move |_event: &HolderEvent| {
            if let Some(h) = holder_in_observer.get() {
                let value = h.get_or_init(|| 99);
                seen_in_observer.store(*value as usize, Ordering::SeqCst);
            }
        }));
        let _ = holder.set(lazy);

        let value = holder.get().unwrap().get_or_init(|| 5);
        assert_eq!(*value, 5);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_panicking_init_allows_retry() {
        let holder: LazyHolder<u32> = LazyHolder::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            holder.get_or_init(|| panic!("init panicked"));
        }));
        assert!(result.is_err());
        assert!(!holder.is_initialized());
        assert_eq!(holder.stats().failed_constructions, 1);

        assert_eq!(*holder.get_or_init(|| 3), 3);
    }

    #[test]
    fn test_slow_path_entries_are_fully_accounted() {
        let holder: LazyHolder<u32> = LazyHolder::new();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            holder.get_or_init(|| panic!("init panicked"));
        }));
        let _ = holder.get_or_try_init(|| Err::<u32, &str>("rejected"));
        holder.get_or_init(|| 1);
        holder.get_or_init(|| 2);

        let stats = holder.stats();
        assert_eq!(stats.slow_path_entries, 3);
        assert_eq!(stats.failed_constructions, 2);
        assert_eq!(stats.constructions, 1);
        assert_eq!(
            stats.slow_path_entries,
            stats.constructions + stats.lost_races + stats.failed_constructions
        );
    }

    #[test]
    fn test_debug_output() {
        let holder = LazyHolder::new();
        assert!(format!("{:?}", holder.get_or_init(|| 1u8)).contains('1'));
        assert!(format!("{:?}", holder).contains("LazyHolder"));
    }
}
