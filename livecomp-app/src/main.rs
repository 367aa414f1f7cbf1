//! Live camera compositor host.
//!
//! Provisions the named surfaces, loads the compositor, and runs the frame
//! pipeline until the process is terminated.

use std::thread;

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use livecomp_compositor::{compositor_loader, SoftwareCompositor};
use livecomp_engine::{PipelineController, RefreshLoop};
use livecomp_frame::SurfaceRegistry;
use livecomp_ipc::{event_channel, CameraState, PipelineConfig, PipelineEvent};
use livecomp_media::SyntheticCamera;

/// Environment variable holding a JSON `PipelineConfig`.
const CONFIG_ENV: &str = "LIVECOMP_CONFIG";

/// Initialize logging.
fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "livecomp=debug,livecomp_engine=debug,livecomp_media=debug,livecomp_compositor=debug,livecomp_frame=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config() -> anyhow::Result<PipelineConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(json) => serde_json::from_str(&json)
            .with_context(|| format!("Invalid pipeline config in {CONFIG_ENV}")),
        Err(_) => Ok(PipelineConfig::default()),
    }
}

/// Create the camera, input and output surfaces the pipeline binds to.
fn provision_surfaces(config: &PipelineConfig) -> SurfaceRegistry {
    let registry = SurfaceRegistry::new();
    registry.insert_video(&config.camera_surface);
    registry.insert_canvas(&config.input_surface, config.width, config.height);
    registry.insert_output(&config.output_surface);
    registry
}

fn log_event(event: PipelineEvent) {
    match event {
        PipelineEvent::Metrics(metrics) => debug!(?metrics, "Metrics"),
        PipelineEvent::CompositorFailed { message } => warn!("Compositor failed: {}", message),
        PipelineEvent::CameraStateChanged {
            current: CameraState::Failed { message },
            ..
        } => error!("Camera unavailable for this session: {}", message),
        PipelineEvent::InitialisationDeferred { reason } => {
            warn!("Initialisation deferred: {}", reason)
        }
        other => info!(event = ?other, "Pipeline event"),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Live compositor starting");

    let config = load_config()?;
    let registry = provision_surfaces(&config);

    // The engine arrives asynchronously; the pipeline idles until it does.
    let (loader, compositor) = compositor_loader();
    let engine_registry = registry.clone();
    let (width, height) = (config.width, config.height);
    thread::Builder::new()
        .name("compositor-loader".to_string())
        .spawn(move || {
            let engine = SoftwareCompositor::new(engine_registry, width, height);
            if loader.send(Box::new(engine)).is_err() {
                warn!("Pipeline gone before compositor finished loading");
            }
        })
        .context("Failed to start compositor loader")?;

    let (event_tx, event_rx) = event_channel();
    let controller = PipelineController::new(
        config,
        registry,
        Box::new(compositor),
        Box::new(SyntheticCamera::new()),
    )
    .with_events(event_tx);

    let refresh = RefreshLoop::spawn_configured(controller)?;

    for event in event_rx.iter() {
        log_event(event);
    }

    info!("Event channel closed");
    refresh.join();
    Ok(())
}
