/// Compressed-audio step of the export.
pub mod encoder;
/// Source PCM buffer construction.
pub mod pcm;
/// Sample-rate conversion.
pub mod resample;
