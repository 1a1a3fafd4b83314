use super::*;
use crate::foundation::core::OUTPUT_SAMPLE_RATE;
use crate::foundation::error::ErrorKind;

fn pcm(rate: f64, samples: Vec<f32>) -> MonoPcm {
    MonoPcm {
        sample_rate: rate,
        samples,
    }
}

#[test]
fn output_length_is_rounded_ratio_for_many_rates() {
    for &(n, rate) in &[
        (1_000usize, 5_120.0f64),
        (12_345, 10_240.0),
        (7, 3.0),
        (48_000, 48_000.0),
        (10_000, 655_360.0),
        (999, 44_100.0),
    ] {
        let out = resample_linear(&pcm(rate, vec![0.25; n]), OUTPUT_SAMPLE_RATE).unwrap();
        let expected = (n as f64 * 44_100.0 / rate).round() as usize;
        assert_eq!(out.samples.len(), expected, "n={n} rate={rate}");
        assert_eq!(out.sample_rate, 44_100.0);
    }
}

#[test]
fn resampling_is_deterministic() {
    let src: Vec<f32> = (0..4096).map(|i| ((i as f32) * 0.01).sin()).collect();
    let a = resample_linear(&pcm(10_240.0, src.clone()), OUTPUT_SAMPLE_RATE).unwrap();
    let b = resample_linear(&pcm(10_240.0, src), OUTPUT_SAMPLE_RATE).unwrap();
    assert_eq!(a, b);
}

#[test]
fn upsampling_interpolates_between_neighbours() {
    let out = resample_linear(&pcm(2.0, vec![0.0, 1.0]), 4).unwrap();
    assert_eq!(out.samples, vec![0.0, 0.5, 1.0, 1.0]);
}

#[test]
fn same_rate_is_identity() {
    let src = vec![0.1, -0.2, 0.3];
    let out = resample_linear(&pcm(44_100.0, src.clone()), OUTPUT_SAMPLE_RATE).unwrap();
    assert_eq!(out.samples, src);
}

#[test]
fn degenerate_inputs_are_resample_errors() {
    let err = resample_linear(&pcm(0.0, vec![0.0]), OUTPUT_SAMPLE_RATE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioResample);
    let err = resample_linear(&pcm(44_100.0, vec![]), OUTPUT_SAMPLE_RATE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioResample);
    // One frame at 1 MHz rounds to zero frames at 44.1 kHz.
    let err = resample_linear(&pcm(1_000_000.0, vec![0.0]), OUTPUT_SAMPLE_RATE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioResample);
}
