use std::path::Path;

use tracing::{debug, info};

use crate::audio::pcm::build_source_buffer;
use crate::audio::resample::resample_linear;
use crate::export::backend::MediaBackend;
use crate::export::cancel::{CancelToken, StepStatus};
use crate::export::request::ExportRequest;
use crate::foundation::core::OUTPUT_SAMPLE_RATE;
use crate::foundation::error::ReelResult;

/// Produce the mono 44.1 kHz audio file for `request` at `out`.
///
/// Cancellation is checked before the step and again after the file is written; a cancelled
/// step leaves no file behind.
pub fn encode_audio(
    request: &ExportRequest,
    out: &Path,
    backend: &dyn MediaBackend,
    cancel: &CancelToken,
) -> ReelResult<StepStatus> {
    if cancel.is_cancelled() {
        debug!("audio step skipped: cancelled");
        return Ok(StepStatus::Cancelled);
    }

    let source = build_source_buffer(
        &request.samples,
        request.nominal_sample_rate(),
        request.volume,
    )?;
    let resampled = resample_linear(&source, OUTPUT_SAMPLE_RATE)?;
    debug!(
        source_rate = source.sample_rate,
        source_len = source.samples.len(),
        out_len = resampled.samples.len(),
        "resampled audio"
    );

    if cancel.is_cancelled() {
        return Ok(StepStatus::Cancelled);
    }
    backend.encode_audio(&resampled, out)?;

    if cancel.is_cancelled() {
        let _ = std::fs::remove_file(out);
        return Ok(StepStatus::Cancelled);
    }
    info!(
        out = %out.display(),
        secs = resampled.duration_secs(),
        "encoded audio"
    );
    Ok(StepStatus::Completed)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/encoder.rs"]
mod tests;
