// Media element seam.
//
// The media element owns decoding, buffering and timing. The player only
// talks to it through `MediaCommand`s going in and `MediaEvent`s coming out.

use crate::error::MediaError;

/// An instruction for the media element, produced by the state core.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// Replace the current source and start loading it
    Load(String),
    Play,
    Pause,
    /// Absolute position in seconds
    Seek(f64),
    /// Volume in 0.0 - 1.0
    SetVolume(f64),
    SetMuted(bool),
}

/// A notification raised by the media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback position advanced (or jumped after a seek)
    TimeUpdated(f64),
    /// Duration of the loaded source became known
    MetadataLoaded { duration: f64 },
    /// The loaded source can start playing
    CanPlay,
    /// Playback reached the end of the source
    Ended,
    Playing,
    Paused,
    /// Starting or loading playback failed
    PlaybackFailed { reason: String },
}

/// The capability every playback backend provides.
///
/// Setters for position, volume and mute never fail: the element clamps
/// values it cannot honor.
pub trait MediaElement {
    fn load(&mut self, source: &str) -> Result<(), MediaError>;

    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn position(&self) -> f64;

    /// Duration in seconds, 0.0 until metadata is loaded
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;

    fn volume(&self) -> f64;

    fn is_muted(&self) -> bool;

    /// Applies a single command, returning the failure of `load` or `play`.
    fn apply(&mut self, command: &MediaCommand) -> Result<(), MediaError> {
        match command {
            MediaCommand::Load(source) => self.load(source),
            MediaCommand::Play => self.play(),
            MediaCommand::Pause => {
                self.pause();
                Ok(())
            }
            MediaCommand::Seek(seconds) => {
                self.seek(*seconds);
                Ok(())
            }
            MediaCommand::SetVolume(volume) => {
                self.set_volume(*volume);
                Ok(())
            }
            MediaCommand::SetMuted(muted) => {
                self.set_muted(*muted);
                Ok(())
            }
        }
    }
}
