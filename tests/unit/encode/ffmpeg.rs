use super::*;
use crate::foundation::core::EXPORT_FPS;
use crate::foundation::error::ErrorKind;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: EXPORT_FPS,
        bitrate: 6_000_000,
    }
}

fn missing_ffmpeg() -> FfmpegSinkOpts {
    FfmpegSinkOpts {
        ffmpeg: PathBuf::from("wavereel-definitely-not-ffmpeg"),
        ..FfmpegSinkOpts::default()
    }
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red @ 50% alpha => rgb is 128,0,0 when premul.
    let src = vec![128u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    // Straight red @ 50% alpha => rgb becomes 128,0,0 over black.
    let src = vec![255u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_keeps_opaque_pixels_and_rejects_mismatched_buffers() {
    let src = vec![10u8, 20, 30, 255, 0, 0, 0, 0];
    let mut dst = vec![0u8; 8];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [200, 100, 50, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255, 200, 100, 50, 255]);

    let mut short = vec![0u8; 4];
    let err = flatten_to_opaque_rgba8(&mut short, &src, false, [0, 0, 0, 255]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoAppend);
}

#[test]
fn begin_rejects_odd_or_empty_dimensions_before_spawning() {
    let mut sink = FfmpegSink::new(missing_ffmpeg());
    let err = sink.begin(cfg(11, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoInputSetup);
    let err = sink.begin(cfg(0, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoInputSetup);
}

#[test]
fn begin_reports_missing_binary_as_input_setup() {
    let mut sink = FfmpegSink::new(missing_ffmpeg());
    let err = sink.begin(cfg(16, 16)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoInputSetup);
    assert!(err.to_string().contains("wavereel-definitely-not-ffmpeg"));
}

#[test]
fn push_and_finish_before_begin_fail_with_their_kinds() {
    let mut sink = FfmpegSink::new(missing_ffmpeg());
    let frame = FrameRGBA::solid(16, 16, [0, 0, 0, 255]);
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoAppend);
    let err = sink.finish().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VideoFinalizeWrite);
}

#[test]
fn aac_encoder_requires_output_rate_and_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("audio.m4a");

    let pcm = MonoPcm {
        sample_rate: 48_000.0,
        samples: vec![0.0; 16],
    };
    let err = encode_aac_mono(Path::new("ffmpeg"), &pcm, &out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioEncode);

    let pcm = MonoPcm {
        sample_rate: f64::from(OUTPUT_SAMPLE_RATE),
        samples: vec![0.0; 16],
    };
    let err =
        encode_aac_mono(Path::new("wavereel-definitely-not-ffmpeg"), &pcm, &out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AudioEncode);
    assert!(!out.exists());
    assert!(!dir.path().join("audio.partial.m4a").exists());
}

#[test]
fn unknown_tools_are_not_on_path() {
    assert!(!is_tool_on_path(Path::new("wavereel-definitely-not-ffmpeg")));
}
