//! Round-robin API key selection

use parking_lot::Mutex;
use std::collections::HashMap;

/// Round-robin key selection per model.
///
/// The counter is advanced under a mutex, so concurrent callers always receive distinct
/// positions in the rotation.
#[derive(Debug, Default)]
pub struct KeyBalancer {
    counters: Mutex<HashMap<String, usize>>,
}

impl KeyBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the next key from `pool` for `model`; `None` for an empty pool
    pub fn next_key<'a>(&self, model: &str, pool: &'a [String]) -> Option<&'a String> {
        if pool.is_empty() {
            return None;
        }
        if pool.len() == 1 {
            return pool.first();
        }

        let index = {
            let mut counters = self.counters.lock();
            let counter = counters.entry(model.to_string()).or_insert(0);
            let index = *counter % pool.len();
            *counter = counter.wrapping_add(1);
            index
        };
        pool.get(index)
    }

    /// Forget the rotation position for `model`
    pub fn reset(&self, model: &str) {
        self.counters.lock().remove(model);
    }
}
