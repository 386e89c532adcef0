use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One mutex per player key. An entry lives only while some caller holds
/// or waits on it.
#[derive(Default)]
pub struct PlayerLocks {
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        self.slots.entry(key.to_string()).or_default().clone()
    }

    /// Runs `f` while holding the locks of every key in `keys`.
    ///
    /// Keys are locked in sorted order so two callers sharing players
    /// cannot deadlock. Duplicate keys are locked once.
    pub fn run_exclusive<T>(&self, keys: &[&str], f: impl FnOnce() -> T) -> T {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys.dedup();

        let held: Vec<Arc<Mutex<()>>> = keys.iter().map(|k| self.slot(k)).collect();
        let out = {
            let _guards: Vec<MutexGuard<'_, ()>> = held
                .iter()
                .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner))
                .collect();
            f()
        };
        drop(held);

        // The map's own reference is the last one: nobody is waiting.
        for key in &keys {
            self.slots
                .remove_if(*key, |_, slot| Arc::strong_count(slot) == 1);
        }
        out
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.slots.len()
    }
}
