use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use postframe_core::compositor::{Compositor, EditResult};
use postframe_core::error::CompositorError;
use postframe_core::geometry::CompletedCrop;
use postframe_core::raster::ImageResource;
use postframe_core::transform::TransformParams;

use crate::error::{EditorError, Result};

/// Shared flag telling a render thread its result is no longer wanted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A render running on its own thread.
///
/// The worker delivers exactly one result, or nothing if it was cancelled.
/// Once cancelled, every accessor reports [`EditorError::Cancelled`] even if
/// the bytes had already arrived.
#[derive(Debug)]
pub struct RenderTask {
    rx: mpsc::Receiver<Result<EditResult, CompositorError>>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

/// Spawn the render thread for one save.
pub fn spawn_render(
    compositor: Compositor,
    image: ImageResource,
    crop: CompletedCrop,
    params: TransformParams,
) -> Result<RenderTask> {
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::default();
    let token = cancel.clone();

    let thread = std::thread::Builder::new()
        .name("postframe-render".into())
        .spawn(move || render_job(&compositor, &image, &crop, &params, &token, &tx))?;

    debug!(?crop, "Render thread spawned");
    Ok(RenderTask {
        rx,
        cancel,
        thread: Some(thread),
    })
}

fn render_job(
    compositor: &Compositor,
    image: &ImageResource,
    crop: &CompletedCrop,
    params: &TransformParams,
    token: &CancelToken,
    tx: &mpsc::Sender<Result<EditResult, CompositorError>>,
) {
    if token.is_cancelled() {
        return;
    }
    let surface = match compositor.compose(image, crop, params) {
        Ok(surface) => surface,
        Err(e) => {
            let _ = tx.send(Err(e));
            return;
        }
    };
    // The surface is released here without encoding
    if token.is_cancelled() {
        debug!("Render cancelled before encoding");
        return;
    }
    let result = compositor.finish(&surface, *crop);
    if token.is_cancelled() {
        return;
    }
    let _ = tx.send(result);
}

impl RenderTask {
    /// Handle that cancels this render from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Discard the render. The thread stops at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Block until the render finishes.
    pub fn wait(mut self) -> Result<EditResult> {
        let received = self.rx.recv();
        self.join();
        if self.is_cancelled() {
            return Err(EditorError::Cancelled);
        }
        match received {
            Ok(result) => Ok(result?),
            Err(_) => Err(EditorError::WorkerUnavailable),
        }
    }

    /// Poll without blocking. `None` while the render is still running; the
    /// result itself is handed out only once.
    pub fn try_result(&mut self) -> Option<Result<EditResult>> {
        if self.is_cancelled() {
            return Some(Err(EditorError::Cancelled));
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result.map_err(EditorError::from))
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(EditorError::WorkerUnavailable)),
        }
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Render thread panicked");
            }
        }
    }
}
