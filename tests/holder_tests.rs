//! LazyHolder concurrency tests
//!
//! Threads are released together by a barrier so that as many as possible
//! reach the first (lock-free) check while the slot is still empty.

use onceholder::holder::{HolderEvent, HolderObserver, LazyHolder};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 64;

#[cfg(test)]
mod construction_tests {
    use super::*;

    #[test]
    fn test_concurrent_init_constructs_once() {
        let holder = LazyHolder::new();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let results: Vec<Arc<usize>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|i| {
                    let (holder, calls, barrier) = (&holder, &calls, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        holder.get_or_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            i
                        })
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = &results[0];
        assert!(results.iter().all(|r| Arc::ptr_eq(r, first)));
        assert!(**first < THREADS);

        let stats = holder.stats();
        assert_eq!(stats.constructions, 1);
        assert_eq!(stats.lost_races, stats.slow_path_entries - 1);
    }

    #[test]
    fn test_counter_stays_at_one_after_warm_up() {
        let holder = LazyHolder::new();
        holder.get_or_init(|| "warm".to_string());

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        let value = holder.get_or_init(|| "cold".to_string());
                        assert_eq!(*value, "warm");
                    }
                });
            }
        });

        let stats = holder.stats();
        assert_eq!(stats.constructions, 1);
        assert_eq!(stats.slow_path_entries, 1);
    }

    #[test]
    fn test_exactly_one_constructed_event() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let lost = Arc::new(AtomicUsize::new(0));
        let (c, l) = (Arc::clone(&constructed), Arc::clone(&lost));
        let observer: HolderObserver = Arc::new(move |event: &HolderEvent| match event {
            HolderEvent::Constructed => {
                c.fetch_add(1, Ordering::SeqCst);
            }
            HolderEvent::LostRace => {
                l.fetch_add(1, Ordering::SeqCst);
            }
            HolderEvent::ConstructionFailed { .. } => {}
        });
        let holder = LazyHolder::new().with_observer(observer);
        let barrier = Barrier::new(THREADS);

        thread::scope(|scope| {
            for i in 0..THREADS {
                let (holder, barrier) = (&holder, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    holder.get_or_init(|| i);
                });
            }
        });

        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert_eq!(lost.load(Ordering::SeqCst) as u64, holder.stats().lost_races);
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[test]
    fn test_failure_is_reported_only_to_constructing_caller() {
        let holder: LazyHolder<String> = LazyHolder::new();
        let attempts = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        // 第一次构造尝试失败，之后的尝试成功
        let outcomes: Vec<Result<Arc<String>, String>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|i| {
                    let (holder, attempts, barrier) = (&holder, &attempts, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        holder.get_or_try_init(|| {
                            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                                Err(format!("attempt by {} rejected", i))
                            } else {
                                Ok(format!("built by {}", i))
                            }
                        })
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        let failures = outcomes.iter().filter(|o| o.is_err()).count();
        assert_eq!(failures, 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let successes: Vec<&Arc<String>> =
            outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
        assert_eq!(successes.len(), THREADS - 1);
        assert!(successes.iter().all(|s| Arc::ptr_eq(s, successes[0])));

        let stats = holder.stats();
        assert_eq!(stats.failed_constructions, 1);
        assert_eq!(stats.constructions, 1);
    }
}

#[cfg(test)]
mod visibility_tests {
    use super::*;

    #[derive(Debug)]
    struct Payload {
        fields: Vec<u64>,
    }

    #[test]
    fn test_readers_never_see_partial_value() {
        let holder: LazyHolder<Payload> = LazyHolder::new();
        let done = AtomicBool::new(false);
        let barrier = Barrier::new(9);

        thread::scope(|scope| {
            for _ in 0..8 {
                let (holder, done, barrier) = (&holder, &done, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    while !done.load(Ordering::Acquire) {
                        if let Some(value) = holder.get() {
                            assert_eq!(value.fields.len(), 1024);
                            assert!(value.fields.iter().all(|&f| f == 7));
                        }
                    }
                });
            }

            barrier.wait();
            holder.get_or_init(|| Payload {
                fields: vec![7; 1024],
            });
            done.store(true, Ordering::Release);
        });

        assert!(holder.is_initialized());
    }
}
