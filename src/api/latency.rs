//! In-memory latency histograms for store operations.
//! Handlers record around each planner call; `/api/stats/latency` reads.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

/// Values stored in microseconds.
pub struct LatencyStats {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

impl LatencyStats {
    /// Tracks 1us to 100s, 3 significant figures.
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 100_000_000, 3)
            .expect("valid histogram bounds");
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, d: Duration) {
        let us = d.as_micros().clamp(1, 100_000_000) as u64;
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.record(us);
        }
    }

    pub fn report(&self) -> LatencyReport {
        let Ok(h) = self.inner.lock() else {
            return LatencyReport::default();
        };
        if h.len() == 0 {
            return LatencyReport::default();
        }
        LatencyReport {
            samples: h.len(),
            p50_us: Some(h.value_at_quantile(0.5)),
            p95_us: Some(h.value_at_quantile(0.95)),
            p99_us: Some(h.value_at_quantile(0.99)),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyReport {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

/// One histogram per planner operation, created on first use.
#[derive(Default)]
pub struct LatencyRegistry {
    ops: DashMap<&'static str, LatencyStats>,
}

impl LatencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, op: &'static str, d: Duration) {
        self.ops.entry(op).or_default().record(d);
    }

    pub fn report(&self) -> BTreeMap<&'static str, LatencyReport> {
        self.ops
            .iter()
            .map(|entry| (*entry.key(), entry.value().report()))
            .collect()
    }
}
