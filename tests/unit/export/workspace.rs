use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn paths_live_inside_a_fresh_directory() {
    let root = tempfile::tempdir().unwrap();
    let ws = ExportWorkspace::create(root.path(), 3).unwrap();
    assert!(ws.dir().is_dir());
    assert!(ws.dir().starts_with(root.path()));
    let name = ws.dir().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("wavereel-"), "{name}");
    assert_eq!(ws.audio_path().file_name().unwrap(), "audio.m4a");
    assert_eq!(ws.video_path().file_name().unwrap(), "video.mp4");
    assert_eq!(ws.movie_path().file_name().unwrap(), "movie.mp4");

    let other = ExportWorkspace::create(root.path(), 3).unwrap();
    assert_ne!(ws.dir(), other.dir());
}

#[test]
fn drop_removes_everything() {
    let root = tempfile::tempdir().unwrap();
    let ws = ExportWorkspace::create(root.path(), 1).unwrap();
    std::fs::write(ws.audio_path(), b"a").unwrap();
    let dir = ws.dir().to_path_buf();
    drop(ws);
    assert!(!dir.exists());
}

#[test]
fn into_final_keeps_only_the_movie() {
    let root = tempfile::tempdir().unwrap();
    let ws = ExportWorkspace::create(root.path(), 1).unwrap();
    std::fs::write(ws.audio_path(), b"a").unwrap();
    std::fs::write(ws.video_path(), b"v").unwrap();
    std::fs::write(ws.movie_path(), b"m").unwrap();

    ws.remove_intermediates();
    let movie = ws.into_final();
    assert!(movie.is_file());
    let names: Vec<_> = std::fs::read_dir(movie.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("movie.mp4")]);
    assert!(movie.parent().unwrap().starts_with(root.path()));
}

#[test]
fn missing_root_is_a_workspace_error() {
    let root = tempfile::tempdir().unwrap();
    let err = ExportWorkspace::create(&root.path().join("missing"), 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Workspace);
    assert!(err.to_string().contains("3 attempts"));
}
