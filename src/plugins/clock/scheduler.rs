//! Deferred one-shot and repeating tasks on a simulation clock.
//!
//! The queue knows nothing about the ECS: it stores payloads, hands back the
//! ones whose deadline passed when the clock is advanced, and lets owners
//! cancel through the handle they were given.
//!
//! ```text
//! schedule_once / schedule_repeating  ->  TaskHandle (kept by the owner)
//! advance(dt)                          ->  Vec<Fired<T>> in (deadline, insertion) order
//! cancel(handle)                       ->  entry gone, stale heap slots skipped lazily
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

/// Owned reference to a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub handle: TaskHandle,
    pub task: T,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    task: T,
    deadline: Duration,
    seq: u64,
    repeat: Option<Duration>,
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Resource, Debug)]
pub struct Scheduler<T: Send + Sync + 'static> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    heap: BinaryHeap<Reverse<(Duration, u64, TaskHandle)>>,
    entries: HashMap<TaskHandle, Entry<T>>,
}

impl<T: Send + Sync + 'static> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            heap: BinaryHeap::new(),
            entries: HashMap::default(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Scheduler<T> {
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of live (not cancelled, not finished) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Fire `task` once, `delay` after the current time.
    pub fn schedule_once(&mut self, delay: Duration, task: T) -> TaskHandle {
        self.insert(delay, task, None)
    }

    /// Fire `task` every `interval` until cancelled.
    pub fn schedule_repeating(&mut self, interval: Duration, task: T) -> TaskHandle {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, task, Some(interval))
    }

    /// Returns `false` when the handle was already cancelled or finished.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Drop everything. The clock keeps its current time.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.heap.clear();
    }

    /// Move the clock forward and collect every entry that came due.
    ///
    /// A repeating entry fires at most once per call. Entries scheduled by the
    /// caller while handling the result wait for a later call.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired<T>> {
        self.now += dt;

        let mut fired = Vec::new();
        let mut rearm = Vec::new();

        while let Some(Reverse((deadline, seq, handle))) = self.heap.peek().copied() {
            if deadline > self.now {
                break;
            }
            self.heap.pop();

            let Some(entry) = self.entries.get(&handle) else {
                continue; // cancelled
            };
            if entry.seq != seq {
                continue; // superseded slot
            }

            let repeat = entry.repeat;
            fired.push(Fired { handle, task: entry.task.clone() });

            match repeat {
                Some(interval) => rearm.push((handle, deadline, interval)),
                None => {
                    self.entries.remove(&handle);
                }
            }
        }

        for (handle, deadline, interval) in rearm {
            let mut next = deadline + interval;
            while next <= self.now {
                next += interval;
            }
            let seq = self.bump_seq();
            if let Some(entry) = self.entries.get_mut(&handle) {
                entry.deadline = next;
                entry.seq = seq;
                self.heap.push(Reverse((next, seq, handle)));
            }
        }

        fired
    }

    fn insert(&mut self, delay: Duration, task: T, repeat: Option<Duration>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        let deadline = self.now + delay;
        self.heap.push(Reverse((deadline, seq, handle)));
        self.entries.insert(handle, Entry { task, deadline, seq, repeat });
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Deadline of a pending entry.
    pub fn deadline(&self, handle: TaskHandle) -> Option<Duration> {
        self.entries.get(&handle).map(|e| e.deadline)
    }
}
