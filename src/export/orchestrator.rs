//! Concurrent export run: workspace, audio and video steps, barrier, mux, cleanup.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, info_span, warn};

use crate::audio::encoder::encode_audio;
use crate::export::backend::MediaBackend;
use crate::export::cancel::{CancelToken, StepStatus};
use crate::export::options::ExportOptions;
use crate::export::request::ExportRequest;
use crate::export::workspace::ExportWorkspace;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::rgba::FrameRenderer;
use crate::video::encoder::{VideoJob, encode_video};

/// Message on an export's event stream. `Finished` is always last and arrives exactly once.
#[derive(Debug)]
pub enum ExportEvent {
    /// Video-phase progress in [0, 1]; strictly increasing within a run.
    Progress(f64),
    /// Terminal outcome of the run.
    Finished(ExportOutcome),
}

/// Terminal outcome of one export attempt.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The movie was written; the caller owns the file and its directory.
    Exported(PathBuf),
    /// A step failed.
    Failed(ReelError),
    /// Cancellation was requested before the movie was produced.
    Cancelled,
}

impl ExportOutcome {
    /// The movie location, if one was produced.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Exported(path) => Some(path),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }

    /// Whether the run ended on cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The failure, if the run failed.
    pub fn error(&self) -> Option<&ReelError> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Exported(_) | Self::Cancelled => None,
        }
    }
}

/// Which encoder reported on the join channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Audio,
    Video,
}

/// Runs exports against a [`MediaBackend`].
#[derive(Clone)]
pub struct Exporter {
    backend: Arc<dyn MediaBackend>,
    opts: ExportOptions,
}

impl Exporter {
    /// Exporter using `backend` and `opts`.
    pub fn new(backend: Arc<dyn MediaBackend>, opts: ExportOptions) -> Self {
        Self {
            backend,
            opts: opts.normalized(),
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    /// Run one export to completion on the calling thread.
    ///
    /// Audio and video are produced on two scoped threads observing `cancel`; both are joined
    /// before anything else happens. `on_progress` receives the video-phase progress. Every
    /// intermediate file and the workspace directory are gone when this returns, except the
    /// directory holding the movie on success.
    pub fn run(
        &self,
        request: &ExportRequest,
        renderer: &dyn FrameRenderer,
        cancel: &CancelToken,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> ExportOutcome {
        let span = info_span!(
            "export",
            width = request.width,
            height = request.height,
            playback_secs = request.playback_secs
        );
        let _enter = span.enter();

        let outcome = match self.run_steps(request, renderer, cancel, on_progress) {
            Ok(outcome) => outcome,
            Err(e) => ExportOutcome::Failed(e),
        };
        match &outcome {
            ExportOutcome::Exported(path) => info!(path = %path.display(), "export finished"),
            ExportOutcome::Failed(e) => warn!(kind = %e.kind(), error = %e, "export failed"),
            ExportOutcome::Cancelled => info!("export cancelled"),
        }
        outcome
    }

    fn run_steps(
        &self,
        request: &ExportRequest,
        renderer: &dyn FrameRenderer,
        cancel: &CancelToken,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> ReelResult<ExportOutcome> {
        request.validate()?;
        self.opts.validate()?;
        let ws = ExportWorkspace::create(&self.opts.temp_root, self.opts.workspace_attempts)?;
        let audio_path = ws.audio_path();
        let video_path = ws.video_path();

        let backend = self.backend.as_ref();
        let results = thread::scope(|s| -> ReelResult<Vec<(Step, ReelResult<StepStatus>)>> {
            let (join_tx, join_rx) = mpsc::channel::<(Step, ReelResult<StepStatus>)>();

            let audio_tx = join_tx.clone();
            let audio_out = audio_path.as_path();
            let audio = thread::Builder::new()
                .name("wavereel-audio".into())
                .spawn_scoped(s, move || {
                    let res = encode_audio(request, audio_out, backend, cancel);
                    let _ = audio_tx.send((Step::Audio, res));
                })
                .map_err(|e| anyhow::anyhow!("failed to spawn audio thread: {e}"))?;

            let video_tx = join_tx;
            let video_out = video_path.as_path();
            let bitrate = self.opts.video_bitrate;
            let finalize_delay = self.opts.finalize_delay();
            let video = thread::Builder::new()
                .name("wavereel-video".into())
                .spawn_scoped(s, move || {
                    let job = VideoJob {
                        width: request.width,
                        height: request.height,
                        playback_secs: request.playback_secs,
                        bitrate,
                        finalize_delay,
                        out: video_out,
                    };
                    let mut sink = backend.video_sink();
                    let res = encode_video(&job, renderer, sink.as_mut(), cancel, on_progress);
                    let _ = video_tx.send((Step::Video, res));
                });
            let video = match video {
                Ok(handle) => handle,
                Err(e) => {
                    // The audio thread still has to be joined before the workspace goes away.
                    cancel.cancel();
                    let _ = audio.join();
                    return Err(anyhow::anyhow!("failed to spawn video thread: {e}").into());
                }
            };

            let mut results = Vec::with_capacity(2);
            while let Ok(msg) = join_rx.recv() {
                debug!(step = ?msg.0, ok = msg.1.is_ok(), "encoder step finished");
                results.push(msg);
            }
            for (step, handle) in [(Step::Audio, audio), (Step::Video, video)] {
                if handle.join().is_err() && !results.iter().any(|(s, _)| *s == step) {
                    error!(step = ?step, "encoder thread panicked");
                    results.push((
                        step,
                        Err(anyhow::anyhow!("{step:?} encoder thread panicked").into()),
                    ));
                }
            }
            Ok(results)
        })?;

        let mut cancelled = cancel.is_cancelled();
        for (step, res) in results {
            match res {
                Err(e) => {
                    debug!(step = ?step, kind = %e.kind(), "first failure wins");
                    return Err(e);
                }
                Ok(StepStatus::Cancelled) => cancelled = true,
                Ok(StepStatus::Completed) => {}
            }
        }
        if cancelled {
            return Ok(ExportOutcome::Cancelled);
        }

        let movie = ws.movie_path();
        let muxed = self.backend.mux(&audio_path, &video_path, &movie);
        ws.remove_intermediates();
        match muxed? {
            StepStatus::Completed => Ok(ExportOutcome::Exported(ws.into_final())),
            StepStatus::Cancelled => Ok(ExportOutcome::Cancelled),
        }
    }

    /// Run an export on a background thread and stream its events.
    ///
    /// The returned handle's channel carries progress values followed by exactly one
    /// [`ExportEvent::Finished`]; the channel closes right after it. The channel is bounded, so
    /// the run stalls until its events are consumed.
    pub fn spawn(
        &self,
        request: ExportRequest,
        renderer: Arc<dyn FrameRenderer>,
    ) -> ReelResult<ExportHandle> {
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::sync_channel(self.opts.progress_capacity.max(1));
        let exporter = self.clone();
        let run_cancel = cancel.clone();
        let thread = thread::Builder::new()
            .name("wavereel-export".into())
            .spawn(move || {
                let progress_tx = tx.clone();
                let outcome = exporter.run(
                    &request,
                    renderer.as_ref(),
                    &run_cancel,
                    &mut move |p| {
                        let _ = progress_tx.send(ExportEvent::Progress(p));
                    },
                );
                let _ = tx.send(ExportEvent::Finished(outcome));
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn export thread: {e}"))?;

        Ok(ExportHandle {
            events: rx,
            cancel,
            thread: Some(thread),
        })
    }
}

/// A running export started by [`Exporter::spawn`].
pub struct ExportHandle {
    events: Receiver<ExportEvent>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl ExportHandle {
    /// Event stream of the run.
    pub fn events(&self) -> &Receiver<ExportEvent> {
        &self.events
    }

    /// Cancellation token of the run.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Request cancellation. Returns `true` for the first request only.
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }

    /// Drain the event stream, returning the terminal outcome.
    pub fn wait(self) -> ExportOutcome {
        self.wait_with(|_| {})
    }

    /// Drain the event stream, passing each progress value to `on_progress`, and join the
    /// export thread.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(f64)) -> ExportOutcome {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                ExportEvent::Progress(p) => on_progress(p),
                ExportEvent::Finished(o) => outcome = Some(o),
            }
        }
        if let Some(t) = self.thread.take()
            && t.join().is_err()
        {
            error!("export thread panicked");
        }
        outcome.unwrap_or_else(|| {
            ExportOutcome::Failed(anyhow::anyhow!("export ended without an outcome").into())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/orchestrator.rs"]
mod tests;
