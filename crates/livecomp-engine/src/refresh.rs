//! Display-refresh driver for the pipeline controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::controller::PipelineController;
use crate::error::EngineError;
use crate::EngineResult;

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5);
const METRICS_INTERVAL: Duration = Duration::from_secs(1);

/// Runs [`PipelineController::tick`] once per refresh on a dedicated thread.
///
/// Exactly one tick is pending at a time. The next deadline is armed before
/// the current tick runs, and an overrunning tick delays the schedule rather
/// than causing a burst of catch-up ticks.
pub struct RefreshLoop {
    handle: Option<JoinHandle<()>>,
    should_stop: Arc<AtomicBool>,
}

impl RefreshLoop {
    /// Start ticking `controller` at `refresh_rate_hz`.
    #[instrument(name = "refresh_loop_spawn", skip(controller))]
    pub fn spawn(controller: PipelineController, refresh_rate_hz: f32) -> EngineResult<Self> {
        if !refresh_rate_hz.is_finite() || refresh_rate_hz <= 0.0 {
            return Err(EngineError::InvalidRefreshRate(refresh_rate_hz));
        }

        let interval = Duration::try_from_secs_f32(1.0 / refresh_rate_hz)
            .map_err(|_| EngineError::InvalidRefreshRate(refresh_rate_hz))?;
        let should_stop = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&should_stop);

        let handle = thread::Builder::new()
            .name("refresh-loop".to_string())
            .spawn(move || refresh_loop(controller, interval, stop))?;

        info!(refresh_rate_hz, "Refresh loop started");
        Ok(Self {
            handle: Some(handle),
            should_stop,
        })
    }

    /// Start ticking at the controller's configured refresh rate.
    pub fn spawn_configured(controller: PipelineController) -> EngineResult<Self> {
        let rate = controller.config().refresh_rate_hz;
        Self::spawn(controller, rate)
    }

    /// Whether the loop thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop ticking and wait for the loop thread to exit.
    pub fn stop(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Block until the loop thread exits. Without [`RefreshLoop::stop`]
    /// this never returns.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Main refresh loop.
fn refresh_loop(
    mut controller: PipelineController,
    interval: Duration,
    should_stop: Arc<AtomicBool>,
) {
    debug!("Refresh loop starting");

    let metrics = controller.metrics();
    metrics.start();

    let start_time = Instant::now();
    let mut next_tick = Instant::now();
    let mut last_log_time = Instant::now();
    let mut last_metrics_time = Instant::now();

    while !should_stop.load(Ordering::SeqCst) {
        // Arm the next tick before running this one.
        next_tick += interval;

        controller.tick();

        if last_metrics_time.elapsed() >= METRICS_INTERVAL {
            controller.report_metrics();
            last_metrics_time = Instant::now();
        }

        if last_log_time.elapsed() >= STATS_LOG_INTERVAL {
            let snapshot = metrics.snapshot();
            info!(
                "Pipeline stats: ticks={}, captured={}, dispatched={}, failures={}, uptime={:.1}s",
                snapshot.ticks,
                snapshot.frames_captured,
                snapshot.frames_dispatched,
                snapshot.dispatch_failures,
                start_time.elapsed().as_secs_f32()
            );
            last_log_time = Instant::now();
        }

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            next_tick = now;
        }
    }

    metrics.stop();
    let snapshot = metrics.snapshot();
    info!(
        "Refresh loop stopped: ticks={}, captured={}, dispatched={}, failures={}",
        snapshot.ticks,
        snapshot.frames_captured,
        snapshot.frames_dispatched,
        snapshot.dispatch_failures
    );
}
