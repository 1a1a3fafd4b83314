use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn defaults_match_export_contract() {
    let opts = ExportOptions::default();
    assert_eq!(opts.workspace_attempts, 3);
    assert_eq!(opts.video_bitrate, 6_000_000);
    assert_eq!(opts.finalize_delay(), Duration::from_millis(100));
    assert_eq!(opts.ffmpeg_path, PathBuf::from("ffmpeg"));
}

#[test]
fn json_overrides_only_given_keys_and_clamps_counts() {
    let opts = ExportOptions::from_json_str(
        r#"{ "finalize_delay_ms": 0, "frame_queue_depth": 0, "temp_root": "/var/tmp" }"#,
    )
    .unwrap();
    assert_eq!(opts.finalize_delay_ms, 0);
    assert_eq!(opts.frame_queue_depth, 1);
    assert_eq!(opts.temp_root, PathBuf::from("/var/tmp"));
    assert_eq!(opts.progress_capacity, 64);
}

#[test]
fn bad_json_or_values_are_validation_errors() {
    let err = ExportOptions::from_json_str("{ not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = ExportOptions::from_json_str(r#"{ "video_bitrate": 0 }"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn missing_options_file_is_unclassified() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExportOptions::from_json_path(&dir.path().join("nope.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
}
