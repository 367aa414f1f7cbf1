//! A compositor that becomes available some time after startup.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use tracing::{info, warn};

use livecomp_frame::PixelBuffer;

use crate::error::CompositorError;
use crate::{Compositor, CompositorResult};

/// Delivers the loaded engine to a [`DeferredCompositor`].
pub type CompositorLoader = Sender<Box<dyn Compositor>>;

/// Create a loader and the compositor it feeds.
pub fn compositor_loader() -> (CompositorLoader, DeferredCompositor) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (tx, DeferredCompositor::new(rx))
}

/// Stands in for an engine that is still loading.
///
/// Reports unavailable until the engine arrives on its channel; afterwards
/// every call is forwarded.
pub struct DeferredCompositor {
    loaded: Mutex<Option<Box<dyn Compositor>>>,
    pending: Receiver<Box<dyn Compositor>>,
    abandoned: AtomicBool,
}

impl DeferredCompositor {
    fn new(pending: Receiver<Box<dyn Compositor>>) -> Self {
        Self {
            loaded: Mutex::new(None),
            pending,
            abandoned: AtomicBool::new(false),
        }
    }

    fn load(&self) {
        let mut loaded = self.loaded.lock();
        if loaded.is_some() {
            return;
        }

        match self.pending.try_recv() {
            Ok(engine) => {
                info!("Compositor engine loaded");
                *loaded = Some(engine);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                if !self.abandoned.swap(true, Ordering::Relaxed) {
                    warn!("Compositor loader dropped before delivering an engine");
                }
            }
        }
    }

    fn engine(&mut self) -> CompositorResult<&mut Box<dyn Compositor>> {
        self.load();
        self.loaded
            .get_mut()
            .as_mut()
            .ok_or(CompositorError::Unavailable)
    }
}

impl Compositor for DeferredCompositor {
    fn is_available(&self) -> bool {
        self.load();
        self.loaded
            .lock()
            .as_ref()
            .is_some_and(|engine| engine.is_available())
    }

    fn initialise(&mut self, output_surface: &str) -> CompositorResult<()> {
        self.engine()?.initialise(output_surface)
    }

    fn copy(&mut self, frame: &PixelBuffer) -> CompositorResult<()> {
        self.engine()?.copy(frame)
    }

    fn render(&mut self) -> CompositorResult<()> {
        self.engine()?.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SoftwareCompositor;
    use livecomp_frame::SurfaceRegistry;

    #[test]
    fn test_unavailable_until_loaded() {
        let (loader, mut deferred) = compositor_loader();
        assert!(!deferred.is_available());
        assert!(matches!(
            deferred.initialise("output"),
            Err(CompositorError::Unavailable)
        ));

        let registry = SurfaceRegistry::new();
        let output = registry.insert_output("output");
        loader
            .send(Box::new(SoftwareCompositor::new(registry, 1, 1)))
            .unwrap();

        assert!(deferred.is_available());
        deferred.initialise("output").unwrap();
        deferred
            .copy(&PixelBuffer::filled(1, 1, [0, 0, 9, 255]))
            .unwrap();
        deferred.render().unwrap();
        assert_eq!(output.latest_frame().unwrap().pixel(0, 0), Some([9, 0, 0, 255]));
    }

    #[test]
    fn test_dropped_loader_stays_unavailable() {
        let (loader, deferred) = compositor_loader();
        drop(loader);
        assert!(!deferred.is_available());
        assert!(!deferred.is_available());
    }
}
