use std::path::Path;

use crate::error::AudioError;

/// Playback backend driven by the controller.
///
/// `load` replaces whatever was loaded before and leaves it ready but not
/// yet audible; `play` starts a freshly loaded track or resumes a paused one.
/// `pause`, `stop` and `set_volume` must be safe to call with nothing loaded.
pub trait AudioEngine {
    fn load(&mut self, path: &Path) -> Result<(), AudioError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// `fraction` is in `0.0..=1.0`.
    fn set_volume(&mut self, fraction: f32);
}
