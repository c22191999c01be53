// src/controllers/queue.rs
//
// Last-in-first-out callback stack plus a per-drain seen filter: within one
// drain only the most recently pushed callback for each address is applied.
// Push is called from the listener thread, drain only from the main turn.

use parking_lot::Mutex;
use std::collections::HashSet;

use crate::models::Callback;

#[derive(Debug)]
pub struct DrainReport<E> {
    /// callbacks applied successfully
    pub applied: usize,
    /// older duplicates skipped by the seen filter
    pub discarded: usize,
    /// callbacks whose apply returned an error, with their address
    pub failures: Vec<(String, E)>,
}

impl<E> DrainReport<E> {
    /// Number of times the apply function ran.
    pub fn invoked(&self) -> usize {
        self.applied + self.failures.len()
    }
}

impl<E> Default for DrainReport<E> {
    fn default() -> Self {
        Self {
            applied: 0,
            discarded: 0,
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CoalescingQueue {
    stack: Mutex<Vec<Callback>>,
}

impl CoalescingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, callback: Callback) {
        self.stack.lock().push(callback);
    }

    pub fn len(&self) -> usize {
        self.stack.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }

    /// Pop everything queued so far, newest first, applying the newest
    /// callback per address and discarding the rest. A failing apply does not
    /// stop the drain. Callbacks pushed while draining wait for the next cycle.
    pub fn drain_and_apply<E, F>(&self, mut apply: F) -> DrainReport<E>
    where
        F: FnMut(Callback) -> Result<(), E>,
    {
        // snapshot under the lock; the listener never waits on apply
        let batch = std::mem::take(&mut *self.stack.lock());

        let mut report = DrainReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for callback in batch.into_iter().rev() {
            if seen.contains(callback.address()) {
                report.discarded += 1;
                continue;
            }
            let address = callback.address().to_string();
            match apply(callback) {
                Ok(()) => report.applied += 1,
                Err(e) => report.failures.push((address.clone(), e)),
            }
            seen.insert(address);
        }

        report
    }
}
