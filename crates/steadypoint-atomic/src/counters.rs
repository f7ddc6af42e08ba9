//! Atomic counters for RT-safe telemetry collection.
//!
//! All methods use `Ordering::Relaxed`: counter values are eventually
//! consistent and individual increments do not need to synchronize with
//! other memory operations.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot returned by [`AtomicCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Fixed steps executed.
    pub steps: u64,
    /// Accumulator overruns (host stalled past the per-frame step cap).
    pub overruns: u64,
    /// Raw input events dropped on queue overflow.
    pub dropped_input_events: u64,
    /// Assisted deltas enqueued for injection.
    pub injected_deltas: u64,
    /// Assisted deltas dropped on injection queue overflow.
    pub dropped_injections: u64,
    /// Config swaps applied at frame boundaries.
    pub config_swaps: u64,
    /// Emergency stops triggered.
    pub emergency_stops: u64,
}

/// Atomic counters for the engine hot path.
///
/// # RT Safety
///
/// All `inc_*` methods are RT-safe: a single atomic fetch-add with
/// `Ordering::Relaxed`, no heap allocation, no blocking, no syscalls.
///
/// # Example
///
/// ```rust
/// use steadypoint_atomic::AtomicCounters;
///
/// let counters = AtomicCounters::new();
/// counters.inc_step();
/// counters.inc_overrun();
///
/// let snapshot = counters.snapshot();
/// assert_eq!(snapshot.steps, 1);
/// assert_eq!(snapshot.overruns, 1);
/// ```
#[derive(Debug, Default)]
pub struct AtomicCounters {
    steps: AtomicU64,
    overruns: AtomicU64,
    dropped_input_events: AtomicU64,
    injected_deltas: AtomicU64,
    dropped_injections: AtomicU64,
    config_swaps: AtomicU64,
    emergency_stops: AtomicU64,
}

impl AtomicCounters {
    /// Create counters initialized to zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            dropped_input_events: AtomicU64::new(0),
            injected_deltas: AtomicU64::new(0),
            dropped_injections: AtomicU64::new(0),
            config_swaps: AtomicU64::new(0),
            emergency_stops: AtomicU64::new(0),
        }
    }

    /// Count one executed fixed step.
    #[inline]
    pub fn inc_step(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one accumulator overrun.
    #[inline]
    pub fn inc_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one raw input event lost to queue overflow.
    #[inline]
    pub fn inc_dropped_input(&self) {
        self.dropped_input_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one assisted delta enqueued for injection.
    #[inline]
    pub fn inc_injected(&self) {
        self.injected_deltas.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one assisted delta lost to injection queue overflow.
    #[inline]
    pub fn inc_dropped_injection(&self) {
        self.dropped_injections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one config swap applied at a frame boundary.
    #[inline]
    pub fn inc_config_swap(&self) {
        self.config_swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one emergency stop.
    #[inline]
    pub fn inc_emergency_stop(&self) {
        self.emergency_stops.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter at once. Not atomic across counters; values are
    /// eventually consistent, which is sufficient for telemetry.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            steps: self.steps.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            dropped_input_events: self.dropped_input_events.load(Ordering::Relaxed),
            injected_deltas: self.injected_deltas.load(Ordering::Relaxed),
            dropped_injections: self.dropped_injections.load(Ordering::Relaxed),
            config_swaps: self.config_swaps.load(Ordering::Relaxed),
            emergency_stops: self.emergency_stops.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.steps.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
        self.dropped_input_events.store(0, Ordering::Relaxed);
        self.injected_deltas.store(0, Ordering::Relaxed);
        self.dropped_injections.store(0, Ordering::Relaxed);
        self.config_swaps.store(0, Ordering::Relaxed);
        self.emergency_stops.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = AtomicCounters::new();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_increment_and_snapshot() {
        let counters = AtomicCounters::new();
        counters.inc_step();
        counters.inc_step();
        counters.inc_overrun();
        counters.inc_injected();
        counters.inc_config_swap();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.steps, 2);
        assert_eq!(snapshot.overruns, 1);
        assert_eq!(snapshot.injected_deltas, 1);
        assert_eq!(snapshot.config_swaps, 1);
        assert_eq!(snapshot.dropped_input_events, 0);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let counters = AtomicCounters::new();
        counters.inc_step();
        counters.inc_emergency_stop();
        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        use std::sync::Arc;

        let counters = Arc::new(AtomicCounters::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let counters = Arc::clone(&counters);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    counters.inc_step();
                }
            }));
        }
        for handle in handles {
            let joined = handle.join();
            assert!(joined.is_ok());
        }
        assert_eq!(counters.snapshot().steps, 4000);
    }
}
