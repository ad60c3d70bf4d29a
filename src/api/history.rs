//! Recent access violation history.
//!
//! A bounded ring of the latest violations behind its own lock, separate from
//! the registry lock. The oldest entry is dropped when full.

use std::collections::VecDeque;

use crate::sync::mutex::Mutex;

use super::error::AccessViolation;

/// The most recent access violations, oldest first.
pub(crate) struct ViolationHistory {
    ring: Mutex<VecDeque<AccessViolation>>,
    capacity: usize,
}

impl ViolationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, violation: AccessViolation) {
        let mut ring = self.ring.lock();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(violation);
    }

    /// Copy out the current contents without removing them.
    pub fn snapshot(&self) -> Vec<AccessViolation> {
        self.ring.lock().iter().cloned().collect()
    }

    /// Remove and return the current contents.
    pub fn drain(&self) -> Vec<AccessViolation> {
        self.ring.lock().drain(..).collect()
    }
}
