/// RGBA frame type and the frame-rendering seam.
pub mod rgba;
/// Default waveform-and-dial frame renderer.
pub mod waveform;
