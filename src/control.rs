use anyhow::Result;
use log::info;

use crate::audio::AudioSource;

/// One-shot Play button logic guarded by the Playback Flag.
#[derive(Debug, Default)]
pub struct PlaybackControl {
    is_playing: bool,
}

impl PlaybackControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Playback Flag. Never returns to `false` once set.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Unlock the audio engine and start playback on the first call.
    ///
    /// Returns `Ok(true)` if this call started playback and `Ok(false)` if it
    /// had already been started. On error the flag stays unset so a later
    /// activation can try again.
    pub fn activate<S: AudioSource + ?Sized>(&mut self, source: &mut S) -> Result<bool> {
        if self.is_playing {
            return Ok(false);
        }

        source.start()?;
        source.play()?;
        self.is_playing = true;
        info!("Playback flag set");
        Ok(true)
    }
}
