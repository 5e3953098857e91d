use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Byte counters shared between a worker and the progress overlay
#[derive(Debug, Clone, Default)]
pub struct LoadProgress {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    loaded: AtomicU64,
    total: AtomicU64,
}

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total(&self, total: u64) {
        self.inner.total.store(total, Ordering::Relaxed);
    }

    pub fn advance(&self, bytes: u64) {
        self.inner.loaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn loaded(&self) -> u64 {
        self.inner.loaded.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.inner.total.load(Ordering::Relaxed)
    }

    /// Floor of loaded / total as a percentage, 0 while the total is unknown
    pub fn percent(&self) -> u32 {
        percent_of(self.loaded(), self.total())
    }
}

pub fn percent_of(loaded: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let loaded = loaded.min(total) as u128;
    (loaded * 100 / total as u128) as u32
}
