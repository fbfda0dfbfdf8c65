//! Link throughput measurement
//!
//! The device write blocks, so the link's bandwidth sets the frame rate.
//! [`ThroughputMeter`] turns bytes-written per render into frames and bytes
//! per second over a window of frames. The caller supplies the timestamps.

use embassy_time::{Duration, Instant};

/// Default number of frames per measurement window
pub const DEFAULT_WINDOW: u32 = 64;

/// Rates measured over one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputReport {
    pub frames: u32,
    pub bytes: u64,
    pub elapsed: Duration,
    pub fps: f32,
    pub bytes_per_second: f32,
}

/// Windowed frame rate and bandwidth meter
///
/// # Usage
///
/// ```ignore
/// let mut meter = ThroughputMeter::new(Instant::now());
///
/// loop {
///     let written = controller.render()?;
///     if let Some(report) = meter.record(written, Instant::now()) {
///         log::info!("fps: {} ({} KB/s)", report.fps, report.bytes_per_second / 1000.0);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    window: u32,
    frames: u32,
    bytes: u64,
    window_start: Instant,
}

impl ThroughputMeter {
    /// Create a meter with the default window, starting at `now`
    pub fn new(now: Instant) -> Self {
        Self::with_window(now, DEFAULT_WINDOW)
    }

    pub fn with_window(now: Instant, window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            bytes: 0,
            window_start: now,
        }
    }

    /// Account one rendered frame
    ///
    /// Returns a report and starts a new window every `window` frames.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, bytes_written: usize, now: Instant) -> Option<ThroughputReport> {
        self.frames += 1;
        self.bytes += bytes_written as u64;
        if self.frames < self.window {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.window_start);
        // avoid dividing by zero on coarse clocks
        let seconds = elapsed.as_micros().max(1) as f32 / 1_000_000.0;
        let report = ThroughputReport {
            frames: self.frames,
            bytes: self.bytes,
            elapsed,
            fps: self.frames as f32 / seconds,
            bytes_per_second: self.bytes as f32 / seconds,
        };

        self.frames = 0;
        self.bytes = 0;
        self.window_start = now;
        Some(report)
    }
}
