//! The registry shared between threads.

use codex::{Entry, EntryId, Registry, SequentialGenerator};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

struct Worker {
    id: EntryId,
    index: usize,
}

impl Entry for Worker {
    fn id(&self) -> EntryId {
        self.id
    }
}

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

#[test]
fn concurrent_creates_are_all_registered() {
    let registry = Registry::new();

    let ids: Vec<EntryId> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let registry = &registry;
                s.spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            registry
                                .create(|id| Worker {
                                    id,
                                    index: t * PER_THREAD + i,
                                })
                                .unwrap()
                                .id()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(registry.len(), THREADS * PER_THREAD);
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    for id in &ids {
        assert!(registry.lookup::<Worker>(*id).is_some());
    }
}

#[test]
fn concurrent_removes_each_succeed_once() {
    let registry = Arc::new(Registry::with_generator(Box::new(
        SequentialGenerator::default(),
    )));
    let ids: Vec<EntryId> = (0..THREADS * PER_THREAD)
        .map(|index| registry.create(|id| Worker { id, index }).unwrap().id())
        .collect();

    // Every thread tries to remove every entry; exactly one wins each.
    let wins: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let ids = &ids;
                s.spawn(move || {
                    ids.iter()
                        .filter(|id| registry.remove(**id).is_removed())
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(wins, ids.len());
    assert!(registry.is_empty());
}

#[test]
fn readers_and_writers_interleave() {
    let registry = Registry::new();
    let seed: Vec<EntryId> = (0..64)
        .map(|index| registry.create(|id| Worker { id, index }).unwrap().id())
        .collect();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for id in &seed {
                    if let Some(index) = registry.with(*id, |w: &Worker| w.index) {
                        assert!(index < 64);
                    }
                }
            });
        }
        s.spawn(|| {
            for id in seed.iter().step_by(2) {
                registry.remove(*id);
            }
        });
        s.spawn(|| {
            for index in 64..128 {
                let _ = registry.create(|id| Worker { id, index }).unwrap();
            }
        });
    });

    assert_eq!(registry.len(), 64 - 32 + 64);
    for id in seed.iter().skip(1).step_by(2) {
        assert!(registry.contains(*id));
    }
}

#[test]
fn lock_makes_multi_step_updates_atomic() {
    let registry = Registry::new();
    let counter = registry.create(|id| Worker { id, index: 0 }).unwrap().id();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..PER_THREAD {
                    let mut locked = registry.lock();
                    let current = locked.lookup::<Worker>(counter).unwrap().index;
                    locked.lookup_mut::<Worker>(counter).unwrap().index = current + 1;
                }
            });
        }
    });

    assert_eq!(
        registry.with(counter, |w: &Worker| w.index),
        Some(THREADS * PER_THREAD)
    );
}
