//! Common types used across pipeline messages.

use serde::{Deserialize, Serialize};

/// Default frame surface width in pixels.
pub const DEFAULT_WIDTH: u32 = 640;

/// Default frame surface height in pixels.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Configuration for a pipeline session.
///
/// Sizes the frame surface only; the camera request always uses
/// [`CameraConstraints::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Logical name of the video presentation surface.
    pub camera_surface: String,

    /// Logical name of the input canvas backing the frame surface.
    pub input_surface: String,

    /// Logical name of the compositor's output surface.
    pub output_surface: String,

    /// Frame surface width in pixels.
    pub width: u32,

    /// Frame surface height in pixels.
    pub height: u32,

    /// Display refresh rate driving the tick loop.
    pub refresh_rate_hz: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera_surface: "camera".to_string(),
            input_surface: "input".to_string(),
            output_surface: "output".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            refresh_rate_hz: 60.0,
        }
    }
}

/// An exact-match constraint on a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactConstraint {
    pub exact: u32,
}

/// Video track constraints.
///
/// Field order matches the wire shape `{ height, width }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub height: ExactConstraint,
    pub width: ExactConstraint,
}

/// Constraints sent with a camera stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConstraints {
    /// Whether an audio track is requested. Always false.
    pub audio: bool,

    /// Video track constraints.
    pub video: VideoConstraints,
}

impl CameraConstraints {
    /// Video-only constraints demanding exactly `width`×`height`.
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            audio: false,
            video: VideoConstraints {
                height: ExactConstraint { exact: height },
                width: ExactConstraint { exact: width },
            },
        }
    }

    /// Requested `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.video.width.exact, self.video.height.exact)
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self::exact(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Pipeline counters reported to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Ticks per second since the last report.
    pub ticks_per_second: f32,

    /// Target refresh rate.
    pub target_rate_hz: f32,

    /// Total ticks executed.
    pub ticks: u64,

    /// Frames captured into the frame surface.
    pub frames_captured: u64,

    /// Frames handed to the compositor and rendered.
    pub frames_dispatched: u64,

    /// Dispatch attempts that failed inside the compositor.
    pub dispatch_failures: u64,

    /// Seconds since the loop started.
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_wire_shape() {
        let json = serde_json::to_string(&CameraConstraints::default()).unwrap();
        assert_eq!(
            json,
            r#"{"audio":false,"video":{"height":{"exact":480},"width":{"exact":640}}}"#
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"refresh_rate_hz":30.0}"#).unwrap();
        assert_eq!(config.refresh_rate_hz, 30.0);
        assert_eq!(config.camera_surface, "camera");
        assert_eq!((config.width, config.height), (640, 480));
    }

    #[test]
    fn test_default_surface_names() {
        let config = PipelineConfig::default();
        assert_eq!(config.camera_surface, "camera");
        assert_eq!(config.input_surface, "input");
        assert_eq!(config.output_surface, "output");
        assert_eq!((config.width, config.height), (640, 480));
    }
}
