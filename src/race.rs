//! Concurrent first-access race
//!
//! 先启动全部 N 个线程并让它们停在起跑闸门前，全部启动成功后一次性放行，
//! 每个线程以各自的载荷调用 `get_instance`，然后汇总结果：所有句柄是否指向
//! 同一实例、胜出的载荷、本轮构造次数和持有器统计。
//! 任何一个线程启动失败时闸门被中止，已启动的线程直接退出。

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use tracing::{debug, info, warn};

use crate::errors::{HolderError, Result};
use crate::holder::{HolderEvent, HolderObserver, StatsSnapshot};
use crate::instance::{InstanceHolder, SingletonInstance};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceReport {
    pub threads: usize,
    /// 所有返回的句柄是否指向同一个实例
    pub all_identical: bool,
    pub winning_payload: String,
    /// 胜出载荷对应的线程序号
    pub winner_index: Option<usize>,
    /// 本轮竞争中发生的构造次数
    pub constructed_events: u64,
    /// 持有器的累计统计
    pub stats: StatsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Aborted,
}

/// 起跑闸门
///
/// 与 `Barrier` 不同，闸门可以被中止，等待中的线程不会永久阻塞。
struct StartGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            changed: Condvar::new(),
        }
    }

    /// 阻塞直到闸门打开或中止，打开时返回 `true`
    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Closed {
            self.changed.wait(&mut state);
        }
        *state == GateState::Open
    }

    fn set(&self, next: GateState) {
        *self.state.lock() = next;
        self.changed.notify_all();
    }
}

/// 在一个新的持有器上运行竞争
pub fn run_race(threads: usize, prefix: &str) -> Result<RaceReport> {
    let constructed = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&constructed);
    let observer: HolderObserver = Arc::new(move |event: &HolderEvent| {
        if *event == HolderEvent::Constructed {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });
    let holder = InstanceHolder::new().with_observer(observer);

    let mut report = race_on(&holder, threads, prefix)?;
    report.constructed_events = constructed.load(Ordering::Relaxed);

    info!(
        "Race finished: {} threads, identical={}, winner={:?}",
        report.threads, report.all_identical, report.winner_index
    );
    Ok(report)
}

/// 在给定的持有器上运行竞争
///
/// `constructed_events` 是本轮前后持有器构造计数之差；对已初始化的持有器为 0。
pub fn race_on(holder: &InstanceHolder, threads: usize, prefix: &str) -> Result<RaceReport> {
    race_with_spawn_budget(holder, threads, prefix, usize::MAX)
}

/// `spawn_budget` 限制可以启动的线程数，超出部分按启动失败处理
fn race_with_spawn_budget(
    holder: &InstanceHolder,
    threads: usize,
    prefix: &str,
    spawn_budget: usize,
) -> Result<RaceReport> {
    if threads == 0 {
        return Err(HolderError::config("Race needs at least one thread"));
    }

    let before = holder.stats();
    let gate = StartGate::new();

    let handles: Vec<Arc<SingletonInstance>> = thread::scope(|scope| {
        let gate = &gate;
        let mut workers = Vec::with_capacity(threads);

        for i in 0..threads {
            let spawned = if i < spawn_budget {
                thread::Builder::new()
                    .name(format!("race-{}", i))
                    .spawn_scoped(scope, move || {
                        gate.wait()
                            .then(|| holder.get_instance(format!("{}{}", prefix, i)))
                    })
            } else {
                Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "thread spawn budget exhausted",
                ))
            };

            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // 已启动的线程在闸门处收到中止后直接退出，scope 随后回收它们
                    gate.set(GateState::Aborted);
                    warn!("Failed to spawn race worker {}: {}", i, e);
                    return Err(HolderError::thread(format!(
                        "Failed to spawn race worker {} of {}: {}",
                        i, threads, e
                    )));
                }
            }
        }

        gate.set(GateState::Open);

        let joined: Vec<_> = workers.into_iter().map(|worker| worker.join()).collect();
        joined
            .into_iter()
            .map(|outcome| match outcome {
                Ok(Some(instance)) => Ok(instance),
                Ok(None) => Err(HolderError::thread("Race worker was never released")),
                Err(_) => Err(HolderError::thread("Race worker panicked")),
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let first = &handles[0];
    let all_identical = handles.iter().all(|h| Arc::ptr_eq(h, first));
    let winning_payload = first.data().to_string();
    let winner_index = winning_payload
        .strip_prefix(prefix)
        .and_then(|rest| rest.parse::<usize>().ok());
    let stats = holder.stats();

    debug!("Race stats: {:?}", stats);

    Ok(RaceReport {
        threads,
        all_identical,
        winning_payload,
        winner_index,
        constructed_events: stats.constructions - before.constructions,
        stats,
    })
}
