//! Frame-by-frame video step of the export.

/// Render loop and encoder state machine.
pub mod encoder;
