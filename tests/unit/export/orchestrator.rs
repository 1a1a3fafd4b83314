use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn outcome_collapses_to_an_optional_path() {
    let ok = ExportOutcome::Exported(PathBuf::from("/tmp/wavereel-x/movie.mp4"));
    assert!(ok.error().is_none());
    assert!(!ok.is_cancelled());
    assert_eq!(ok.into_path(), Some(PathBuf::from("/tmp/wavereel-x/movie.mp4")));

    let failed = ExportOutcome::Failed(ReelError::mux_export("nope"));
    assert_eq!(failed.error().map(ReelError::kind), Some(ErrorKind::MuxExport));
    assert_eq!(failed.into_path(), None);

    assert!(ExportOutcome::Cancelled.is_cancelled());
    assert_eq!(ExportOutcome::Cancelled.into_path(), None);
}

#[test]
fn options_are_normalized_on_construction() {
    let opts = ExportOptions {
        progress_capacity: 0,
        workspace_attempts: 0,
        ..ExportOptions::default()
    };
    let ex = Exporter::new(Arc::new(crate::export::backend::FfmpegBackend::default()), opts);
    assert_eq!(ex.options().progress_capacity, 1);
    assert_eq!(ex.options().workspace_attempts, 1);
}
