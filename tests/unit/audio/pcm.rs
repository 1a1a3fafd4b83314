use super::*;

#[test]
fn fixed_volume_clamps_and_silences_non_finite() {
    let pcm = build_source_buffer(&[0.5, 2.0, -3.0, f32::NAN], 100.0, VolumeModifier::Fixed)
        .unwrap();
    assert_eq!(pcm.samples, vec![0.5, 1.0, -1.0, 0.0]);
    assert_eq!(pcm.sample_rate, 100.0);
}

#[test]
fn auto_adjusted_normalizes_to_full_scale() {
    let pcm = build_source_buffer(&[0.1, -0.25, 0.2], 10.0, VolumeModifier::AutoAdjusted)
        .unwrap();
    assert!((pcm.samples[0] - 0.4).abs() < 1e-6);
    assert!((pcm.samples[1] + 1.0).abs() < 1e-6);
    assert!((pcm.samples[2] - 0.8).abs() < 1e-6);

    let silent = build_source_buffer(&[0.0; 4], 10.0, VolumeModifier::AutoAdjusted).unwrap();
    assert_eq!(silent.samples, vec![0.0; 4]);
}

#[test]
fn empty_or_rateless_input_is_a_buffer_error() {
    use crate::foundation::error::ErrorKind;

    let err = build_source_buffer(&[], 10.0, VolumeModifier::Fixed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioBuffer);
    let err = build_source_buffer(&[0.0], 0.0, VolumeModifier::Fixed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioBuffer);
}

#[test]
fn f32le_bytes_are_little_endian() {
    let pcm = MonoPcm {
        sample_rate: 1.0,
        samples: vec![1.0, -0.5],
    };
    let bytes = pcm.to_f32le_bytes();
    assert_eq!(bytes.len(), 8);
    assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..8], &(-0.5f32).to_le_bytes());
    assert!((pcm.duration_secs() - 2.0).abs() < 1e-12);
}
