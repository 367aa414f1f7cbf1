//! Metrics collection and reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

use livecomp_ipc::PipelineMetrics;

/// Collects pipeline counters.
pub struct MetricsCollector {
    start_time: RwLock<Option<Instant>>,
    ticks: AtomicU64,
    frames_captured: AtomicU64,
    frames_dispatched: AtomicU64,
    dispatch_failures: AtomicU64,
    last_report_time: RwLock<Instant>,
    last_tick_count: AtomicU64,
    target_rate_hz: f32,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(target_rate_hz: f32) -> Self {
        Self {
            start_time: RwLock::new(None),
            ticks: AtomicU64::new(0),
            frames_captured: AtomicU64::new(0),
            frames_dispatched: AtomicU64::new(0),
            dispatch_failures: AtomicU64::new(0),
            last_report_time: RwLock::new(Instant::now()),
            last_tick_count: AtomicU64::new(0),
            target_rate_hz,
        }
    }

    /// Start the uptime clock.
    pub fn start(&self) {
        *self.start_time.write() = Some(Instant::now());
        *self.last_report_time.write() = Instant::now();
    }

    /// Stop the uptime clock.
    pub fn stop(&self) {
        *self.start_time.write() = None;
    }

    /// Record a tick.
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capture step.
    pub fn record_capture(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful dispatch.
    pub fn record_dispatch(&self) {
        self.frames_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed dispatch.
    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> PipelineMetrics {
        let now = Instant::now();

        let elapsed = now.duration_since(*self.last_report_time.read());
        let ticks = self.ticks.load(Ordering::Relaxed);
        let last_ticks = self.last_tick_count.load(Ordering::Relaxed);

        let ticks_per_second = if elapsed.as_secs_f32() > 0.0 {
            ticks.saturating_sub(last_ticks) as f32 / elapsed.as_secs_f32()
        } else {
            0.0
        };

        let uptime_seconds = self
            .start_time
            .read()
            .map(|s| now.duration_since(s).as_secs())
            .unwrap_or(0);

        PipelineMetrics {
            ticks_per_second,
            target_rate_hz: self.target_rate_hz,
            ticks,
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_dispatched: self.frames_dispatched.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            uptime_seconds,
        }
    }

    /// Update last report time for rate calculation.
    pub fn mark_reported(&self) {
        *self.last_report_time.write() = Instant::now();
        self.last_tick_count
            .store(self.ticks.load(Ordering::Relaxed), Ordering::Relaxed);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = MetricsCollector::new(30.0);
        metrics.record_tick();
        metrics.record_tick();
        metrics.record_capture();
        metrics.record_dispatch();
        metrics.record_dispatch_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.frames_captured, 1);
        assert_eq!(snapshot.frames_dispatched, 1);
        assert_eq!(snapshot.dispatch_failures, 1);
        assert_eq!(snapshot.target_rate_hz, 30.0);
        assert_eq!(snapshot.uptime_seconds, 0);
    }

    #[test]
    fn test_mark_reported_resets_rate_window() {
        let metrics = MetricsCollector::default();
        metrics.start();
        metrics.record_tick();
        metrics.mark_reported();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.ticks_per_second, 0.0);
    }
}
