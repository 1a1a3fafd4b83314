use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, error};

use crate::export::cancel::CancelToken;
use crate::export::orchestrator::{ExportOutcome, Exporter};
use crate::export::request::ExportRequest;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::rgba::FrameRenderer;

struct ActiveRun {
    cancel: CancelToken,
    done: Arc<AtomicBool>,
    forwarder: Option<JoinHandle<()>>,
}

impl ActiveRun {
    fn is_live(&self) -> bool {
        !self.done.load(Ordering::Acquire)
    }
}

/// Caller-facing export entry point holding at most one live export.
///
/// Progress is observable through [`ExportSession::progress`] while a run is live. The completion
/// callback runs exactly once per started export, on a background thread, after progress was
/// cleared.
pub struct ExportSession {
    exporter: Exporter,
    progress: Arc<Mutex<Option<f64>>>,
    active: Mutex<Option<ActiveRun>>,
}

impl ExportSession {
    /// Session running exports through `exporter`.
    pub fn new(exporter: Exporter) -> Self {
        Self {
            exporter,
            progress: Arc::new(Mutex::new(None)),
            active: Mutex::new(None),
        }
    }

    /// Start an export; `on_completed` receives the movie path, or `None` on failure or
    /// cancellation.
    ///
    /// Fails with [`ReelError::SessionBusy`] while another export is live; the callback is not
    /// invoked in that case.
    pub fn start(
        &self,
        request: ExportRequest,
        renderer: Arc<dyn FrameRenderer>,
        on_completed: impl FnOnce(Option<PathBuf>) + Send + 'static,
    ) -> ReelResult<()> {
        self.start_with_outcome(request, renderer, move |outcome| {
            on_completed(outcome.into_path())
        })
    }

    /// Like [`ExportSession::start`], but hands the full [`ExportOutcome`] to the callback.
    pub fn start_with_outcome(
        &self,
        request: ExportRequest,
        renderer: Arc<dyn FrameRenderer>,
        on_outcome: impl FnOnce(ExportOutcome) + Send + 'static,
    ) -> ReelResult<()> {
        let mut active = lock(&self.active);
        if active.as_ref().is_some_and(ActiveRun::is_live) {
            return Err(ReelError::SessionBusy);
        }

        *lock(&self.progress) = None;
        let handle = self.exporter.spawn(request, renderer)?;
        let cancel = handle.cancel_token().clone();
        let done = Arc::new(AtomicBool::new(false));

        let progress = self.progress.clone();
        let run_cancel = cancel.clone();
        let run_done = done.clone();
        let forwarder = std::thread::Builder::new()
            .name("wavereel-session".into())
            .spawn(move || {
                let outcome = handle.wait_with(|p| {
                    let mut slot = lock(&progress);
                    if !run_cancel.is_cancelled() {
                        *slot = Some(p);
                    }
                });
                *lock(&progress) = None;
                if let ExportOutcome::Failed(e) = &outcome {
                    error!(kind = %e.kind(), error = %e, "export failed");
                }
                run_done.store(true, Ordering::Release);
                on_outcome(outcome);
            });
        let forwarder = match forwarder {
            Ok(t) => t,
            Err(e) => {
                // Nobody would drain the run's events; stop it.
                cancel.cancel();
                return Err(anyhow::anyhow!("failed to spawn session thread: {e}").into());
            }
        };

        // The previous forwarder is detached; it may still be inside its callback.
        *active = Some(ActiveRun {
            cancel,
            done,
            forwarder: Some(forwarder),
        });
        debug!("export started");
        Ok(())
    }

    /// Current video-phase progress, or `None` when no export is live.
    pub fn progress(&self) -> Option<f64> {
        *lock(&self.progress)
    }

    /// Whether an export is live.
    pub fn is_running(&self) -> bool {
        lock(&self.active).as_ref().is_some_and(ActiveRun::is_live)
    }

    /// Request cancellation of the live export and clear progress immediately.
    ///
    /// No-op without a live export; repeated calls have no further effect.
    pub fn cancel(&self) {
        let active = lock(&self.active);
        let Some(run) = active.as_ref().filter(|r| r.is_live()) else {
            return;
        };
        if run.cancel.cancel() {
            debug!("export cancellation requested");
        }
        *lock(&self.progress) = None;
    }

    /// Block until the most recent export's callback has returned.
    ///
    /// Must not be called from the completion callback itself.
    pub fn wait(&self) {
        let forwarder = lock(&self.active).as_mut().and_then(|r| r.forwarder.take());
        if let Some(t) = forwarder
            && t.join().is_err()
        {
            error!("export completion callback panicked");
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
