use crate::audio::pcm::MonoPcm;
use crate::foundation::error::{ReelError, ReelResult};

/// Number of output frames for `input_frames` converted from `from_rate` to `to_rate`.
///
/// `round(input_frames * to_rate / from_rate)`; the result depends only on its inputs.
pub fn resampled_len(input_frames: usize, from_rate: f64, to_rate: u32) -> usize {
    ((input_frames as f64) * f64::from(to_rate) / from_rate).round() as usize
}

/// Linearly interpolate `pcm` onto `to_rate`.
///
/// Output frame `i` samples the source at position `i * from_rate / to_rate`, blending the two
/// neighbouring source frames; positions past the last frame hold the last sample.
pub fn resample_linear(pcm: &MonoPcm, to_rate: u32) -> ReelResult<MonoPcm> {
    if !pcm.sample_rate.is_finite() || pcm.sample_rate <= 0.0 {
        return Err(ReelError::audio_resample(format!(
            "source sample rate must be positive, got {}",
            pcm.sample_rate
        )));
    }
    if to_rate == 0 {
        return Err(ReelError::audio_resample("target sample rate must be non-zero"));
    }
    let src = pcm.samples.as_slice();
    if src.is_empty() {
        return Err(ReelError::audio_resample("cannot resample an empty buffer"));
    }

    let out_len = resampled_len(src.len(), pcm.sample_rate, to_rate);
    if out_len == 0 {
        return Err(ReelError::audio_resample(format!(
            "{} frames at {} Hz is shorter than one output frame at {to_rate} Hz",
            src.len(),
            pcm.sample_rate
        )));
    }

    let mut out = Vec::<f32>::new();
    out.try_reserve_exact(out_len).map_err(|e| {
        ReelError::audio_resample(format!("failed to allocate {out_len} output frames: {e}"))
    })?;

    let step = pcm.sample_rate / f64::from(to_rate);
    let last = src.len() - 1;
    for i in 0..out_len {
        let src_pos = (i as f64) * step;
        let frame0 = (src_pos.floor() as usize).min(last);
        let frame1 = (frame0 + 1).min(last);
        let frac = (src_pos - frame0 as f64).clamp(0.0, 1.0) as f32;
        let v0 = src[frame0];
        let v1 = src[frame1];
        out.push(v0 + ((v1 - v0) * frac));
    }

    Ok(MonoPcm {
        sample_rate: f64::from(to_rate),
        samples: out,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/resample.rs"]
mod tests;
