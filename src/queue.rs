//! Bounded ready queue.
//!
//! Insertion order is the tie-break among equal priorities: arrivals and
//! preempted processes join the tail, and selection scans from the head,
//! which yields round-robin among processes of equal priority.

use std::collections::VecDeque;

use crate::error::CapacityExceeded;
use crate::process::{Process, ProcessState};
use crate::types::{Pid, Tick};

/// Upper bound on the slots reserved up front. Larger queues grow on demand.
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Clone)]
pub struct ReadyQueue {
    entries: VecDeque<Process>,
    capacity: usize,
}

impl ReadyQueue {
    pub fn new(capacity: usize) -> Self {
        ReadyQueue {
            entries: VecDeque::with_capacity(capacity.min(MAX_PREALLOC)),
            capacity,
        }
    }

    /// Append a new arrival. Rejects the arrival, leaving the queue
    /// untouched, when the queue is full.
    pub fn push_arrival(&mut self, mut process: Process) -> Result<(), CapacityExceeded> {
        if self.is_full() {
            return Err(CapacityExceeded {
                capacity: self.capacity,
            });
        }
        process.state = ProcessState::Ready;
        self.entries.push_back(process);
        Ok(())
    }

    /// Return a preempted process to the tail.
    ///
    /// Not subject to the capacity limit: the process already counted
    /// against it when it arrived, and its core is refilled from this
    /// queue within the same step.
    pub(crate) fn requeue(&mut self, mut process: Process) {
        process.state = ProcessState::Ready;
        process.time_slice_remaining = 0;
        self.entries.push_back(process);
    }

    /// Index of the process that should run next: the highest priority
    /// among eligible entries (`arrival_tick <= now`), nearest the head on
    /// ties.
    pub fn select_index(&self, now: Tick) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, p)| p.arrival_tick() <= now)
            .fold(None, |best: Option<(usize, &Process)>, (idx, p)| match best {
                Some((_, b)) if b.priority() >= p.priority() => best,
                _ => Some((idx, p)),
            })
            .map(|(idx, _)| idx)
    }

    /// Remove and return the process that should run next.
    pub fn pop_next(&mut self, now: Tick) -> Option<Process> {
        let idx = self.select_index(now)?;
        self.entries.remove(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate in queue order, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.entries.iter()
    }

    /// PIDs in queue order, head first.
    pub fn ordered_pids(&self) -> Vec<Pid> {
        self.entries.iter().map(Process::pid).collect()
    }

    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut VecDeque<Process> {
        &mut self.entries
    }
}
