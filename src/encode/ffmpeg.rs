use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::audio::pcm::MonoPcm;
use crate::encode::sink::{EncodedVideo, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, OUTPUT_SAMPLE_RATE};
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::rgba::FrameRGBA;

const STDOUT_SEGMENT_BYTES: usize = 64 * 1024;

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_on_path(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path(Path::new("ffmpeg"))
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    is_tool_on_path(Path::new("ffprobe"))
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Encode mono PCM at 44.1 kHz to AAC in an MP4 (`.m4a`) container at `out_path`.
///
/// `ffmpeg` writes to a `.partial.m4a` sibling that is renamed into place on success and removed
/// on failure, so `out_path` either holds a complete file or does not exist.
pub fn encode_aac_mono(ffmpeg: &Path, pcm: &MonoPcm, out_path: &Path) -> ReelResult<()> {
    if pcm.sample_rate != f64::from(OUTPUT_SAMPLE_RATE) {
        return Err(ReelError::audio_encode(format!(
            "aac encoder expects {OUTPUT_SAMPLE_RATE} Hz input, got {}",
            pcm.sample_rate
        )));
    }
    let partial = out_path.with_extension("partial.m4a");
    let res = run_aac_encoder(ffmpeg, pcm, &partial).and_then(|()| {
        std::fs::rename(&partial, out_path).map_err(|e| {
            ReelError::audio_write(format!(
                "failed to move encoded audio to '{}': {e}",
                out_path.display()
            ))
        })
    });
    if res.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    res
}

fn run_aac_encoder(ffmpeg: &Path, pcm: &MonoPcm, partial: &Path) -> ReelResult<()> {
    let mut cmd = Command::new(ffmpeg);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "f32le",
            "-ar",
            &OUTPUT_SAMPLE_RATE.to_string(),
            "-ac",
            "1",
            "-i",
            "pipe:0",
            "-c:a",
            "aac",
            "-ar",
            &OUTPUT_SAMPLE_RATE.to_string(),
            "-ac",
            "1",
            "-f",
            "mp4",
        ])
        .arg(partial);

    let mut child = cmd.spawn().map_err(|e| {
        ReelError::audio_encode(format!(
            "failed to spawn '{}' (is it installed and on PATH?): {e}",
            ffmpeg.display()
        ))
    })?;
    let stderr_drain = child.stderr.take().map(drain);

    let write_res = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(&pcm.to_f32le_bytes()),
        None => Err(std::io::Error::other("ffmpeg stdin unavailable")),
    };
    let status = child
        .wait()
        .map_err(|e| ReelError::audio_encode(format!("failed to wait for ffmpeg: {e}")))?;
    let stderr = join_drain(stderr_drain);

    if !status.success() {
        return Err(ReelError::audio_encode(format!(
            "ffmpeg aac encode exited with status {status}: {}",
            String::from_utf8_lossy(&stderr).trim()
        )));
    }
    write_res.map_err(|e| {
        ReelError::audio_encode(format!("failed to stream pcm to ffmpeg stdin: {e}"))
    })
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// `ffmpeg` program to run.
    pub ffmpeg: PathBuf,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Frames that may be queued for the encoder before `wait_until_ready` blocks.
    pub queue_depth: usize,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            bg_rgba: [0, 0, 0, 255],
            queue_depth: 4,
        }
    }
}

#[derive(Default)]
struct Readiness {
    state: Mutex<ReadyState>,
    cv: Condvar,
}

#[derive(Default)]
struct ReadyState {
    in_flight: usize,
    closed: bool,
}

impl Readiness {
    fn lock(&self) -> MutexGuard<'_, ReadyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn frame_written(&self) {
        let mut st = self.lock();
        st.in_flight = st.in_flight.saturating_sub(1);
        self.cv.notify_all();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.cv.notify_all();
    }
}

/// Frame sink that streams raw RGBA into `ffmpeg` and collects fragmented MP4 from its stdout.
///
/// Frames go through a dedicated stdin writer thread; at most `queue_depth` frames are in flight,
/// which is the readiness signal behind [`FrameSink::wait_until_ready`]. Stdout is read in
/// fixed-size chunks that become the [`EncodedVideo`] segments.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    frames_tx: Option<SyncSender<Vec<u8>>>,
    writer: Option<JoinHandle<std::io::Result<()>>>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    ready: Arc<Readiness>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink; `ffmpeg` is spawned in `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            frames_tx: None,
            writer: None,
            stdout_drain: None,
            stderr_drain: None,
            ready: Arc::new(Readiness::default()),
            cfg: None,
            last_idx: None,
        }
    }

    fn stop_threads(&mut self) {
        drop(self.frames_tx.take());
        if let Some(w) = self.writer.take() {
            let _ = w.join();
        }
        if let Some(d) = self.stdout_drain.take() {
            let _ = d.join();
        }
        let _ = join_drain(self.stderr_drain.take());
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::video_input_setup("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::video_input_setup(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::video_input_setup(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(ReelError::video_input_setup("ffmpeg sink already started"));
        }

        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-profile:v",
            "main",
            "-b:v",
            &cfg.bitrate.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "frag_keyframe+empty_moov+default_base_moof",
            "-f",
            "mp4",
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::video_input_setup(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.opts.ffmpeg.display()
            ))
        })?;

        let (Some(mut stdin), Some(mut stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ReelError::video_input_setup(
                "failed to open ffmpeg stdio pipes (unexpected)",
            ));
        };

        let depth = self.opts.queue_depth.max(1);
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(depth);
        let ready = Arc::new(Readiness::default());
        let writer_ready = ready.clone();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            for buf in rx {
                if let Err(e) = stdin.write_all(&buf) {
                    writer_ready.close();
                    return Err(e);
                }
                writer_ready.frame_written();
            }
            writer_ready.close();
            Ok(())
        });

        let stdout_drain = std::thread::spawn(move || -> std::io::Result<Vec<Vec<u8>>> {
            let mut segments = Vec::new();
            let mut buf = vec![0u8; STDOUT_SEGMENT_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                segments.push(buf[..n].to_vec());
            }
            Ok(segments)
        });

        self.child = Some(child);
        self.frames_tx = Some(tx);
        self.writer = Some(writer);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(drain(stderr));
        self.ready = ready;
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn wait_until_ready(&mut self) -> ReelResult<()> {
        let depth = self.opts.queue_depth.max(1);
        let mut st = self.ready.lock();
        while st.in_flight >= depth && !st.closed {
            st = self
                .ready
                .cv
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if st.closed {
            return Err(ReelError::video_append(
                "ffmpeg stopped accepting frames",
            ));
        }
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::video_append("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::video_append(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::video_append(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != frame.expected_len() {
            return Err(ReelError::video_append(
                "frame.data size mismatch with width*height*4",
            ));
        }

        let mut buf = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(&mut buf, &frame.data, frame.premultiplied, self.opts.bg_rgba)?;

        let Some(tx) = self.frames_tx.as_ref() else {
            return Err(ReelError::video_append("ffmpeg sink is already finalized"));
        };
        self.ready.lock().in_flight += 1;
        tx.send(buf).map_err(|_| {
            self.ready.frame_written();
            ReelError::video_append("ffmpeg writer thread is not accepting frames")
        })?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn mark_finished(&mut self) {
        drop(self.frames_tx.take());
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        self.mark_finished();
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::video_finalize_write("ffmpeg sink not started"))?;

        let write_res = match self.writer.take() {
            Some(w) => w
                .join()
                .map_err(|_| ReelError::video_finalize_write("ffmpeg writer thread panicked"))?,
            None => Ok(()),
        };
        let status = child.wait().map_err(|e| {
            ReelError::video_finalize_write(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let segments = match self.stdout_drain.take() {
            Some(d) => d
                .join()
                .map_err(|_| ReelError::video_finalize_write("ffmpeg stdout drain panicked"))?
                .map_err(|e| {
                    ReelError::video_finalize_write(format!("ffmpeg stdout read failed: {e}"))
                })?,
            None => Vec::new(),
        };
        let stderr = join_drain(self.stderr_drain.take());
        self.cfg = None;

        if !status.success() {
            return Err(ReelError::video_finalize_write(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        write_res.map_err(|e| {
            ReelError::video_finalize_write(format!("failed to stream frames to ffmpeg: {e}"))
        })?;
        Ok(EncodedVideo { segments })
    }

    fn abort(&mut self) {
        drop(self.frames_tx.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stop_threads();
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::video_append(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255(bg_r, inv),
                s[1] as u16 + mul_div255(bg_g, inv),
                s[2] as u16 + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv),
                mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv),
                mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
