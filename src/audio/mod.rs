pub mod fft;
pub mod playback;

pub use fft::{SpectrumAnalyser, DEFAULT_FFT_SIZE};
pub use playback::AudioPlayback;

use anyhow::Result;

/// Audio engine the visualiser reads from.
///
/// Implementations decode and play one fixed asset and expose a Magnitude
/// Array: `fft_size / 2` bytes in `0..=255`, refreshed on every call to
/// [`frequency_data`](Self::frequency_data).
pub trait AudioSource {
    /// Unlock or resume the output engine. Safe to call more than once.
    fn start(&mut self) -> Result<()>;

    /// Load the asset if needed and begin playback. Requires `start` first.
    fn play(&mut self) -> Result<()>;

    /// Refresh and return the current Magnitude Array.
    fn frequency_data(&mut self) -> &[u8];

    fn is_playing(&self) -> bool;
}
