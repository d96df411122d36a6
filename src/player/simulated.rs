// ==========================================
// SIMULATED MEDIA ELEMENT
// ==========================================
// A clock-driven stand-in for a real video element.
//
// It does no decoding at all. Instead it keeps a position that advances
// while "playing" and raises the same notifications a real element would:
// - MetadataLoaded and CanPlay once a load completes
// - TimeUpdated while the clock moves (and after every seek)
// - Ended when the position reaches the duration
// - Playing / Paused when the transport changes
//
// Time only moves when tick() is called. The UI loop passes the real
// elapsed time, tests pass whatever they like, so runs are deterministic.
//
// Loads complete on the NEXT tick, never inside load(). Calling play()
// before that fails with NotReady, which is exactly the window a
// "wait a bit and hope" timer would race against.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use crate::error::MediaError;
use crate::player::media::{MediaElement, MediaEvent};
use crate::player::playlist::Playlist;

// ==========================================
// ELEMENT STATE ENUM
// ==========================================
// Same idea as a player state: one value instead of a pile of booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    Empty,   // No source loaded
    Loading, // Source requested, completes on the next tick
    Paused,  // Ready, clock stopped
    Playing, // Ready, clock running
}

pub struct SimulatedElement {
    events: UnboundedSender<MediaEvent>,
    // Length in seconds per source locator
    lengths: HashMap<String, f64>,
    default_length: f64,
    source: Option<String>,
    state: ElementState,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    // When set, every play() is refused with this reason
    rejection: Option<String>,
}

impl SimulatedElement {
    pub fn new(events: UnboundedSender<MediaEvent>) -> Self {
        SimulatedElement {
            events,
            lengths: HashMap::new(),
            default_length: 60.0,
            source: None,
            state: ElementState::Empty,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            rejection: None,
        }
    }

    /// Uses each descriptor's display duration as the length of its source.
    ///
    /// Sources without a parseable label fall back to `default_length`.
    pub fn with_lengths(mut self, playlist: &Playlist, default_length: f64) -> Self {
        self.default_length = default_length.max(0.0);
        for video in playlist.iter() {
            if let Some(seconds) = video.display_seconds() {
                self.lengths.insert(video.source.clone(), seconds);
            }
        }
        self
    }

    pub fn with_length(mut self, source: impl Into<String>, seconds: f64) -> Self {
        self.lengths.insert(source.into(), seconds.max(0.0));
        self
    }

    /// Refuses every play() call, the way a host blocks autoplay.
    pub fn with_rejection(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }

    pub fn state(&self) -> ElementState {
        self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    // ==========================================
    // CLOCK: tick()
    // ==========================================
    // Advances the simulation by `elapsed`.
    //
    // - Loading: the load completes, metadata and can-play are raised.
    //   The clock does not move on this tick.
    // - Playing: the position moves forward. Reaching the duration stops
    //   the clock and raises Ended.
    // - Empty / Paused: nothing happens.
    pub fn tick(&mut self, elapsed: Duration) {
        match self.state {
            ElementState::Loading => {
                self.duration = self.length_of_source();
                self.state = ElementState::Paused;
                self.emit(MediaEvent::MetadataLoaded {
                    duration: self.duration,
                });
                self.emit(MediaEvent::CanPlay);
            }
            ElementState::Playing => {
                self.position += elapsed.as_secs_f64();
                if self.position >= self.duration {
                    self.position = self.duration;
                    self.state = ElementState::Paused;
                    self.emit(MediaEvent::TimeUpdated(self.position));
                    self.emit(MediaEvent::Ended);
                } else {
                    self.emit(MediaEvent::TimeUpdated(self.position));
                }
            }
            ElementState::Empty | ElementState::Paused => {}
        }
    }

    fn length_of_source(&self) -> f64 {
        self.source
            .as_ref()
            .and_then(|source| self.lengths.get(source).copied())
            .unwrap_or(self.default_length)
    }

    fn emit(&self, event: MediaEvent) {
        trace!(?event, "simulated element notification");
        // Nobody listening is fine, the element keeps running
        let _ = self.events.send(event);
    }
}

impl MediaElement for SimulatedElement {
    fn load(&mut self, source: &str) -> Result<(), MediaError> {
        if source.trim().is_empty() {
            return Err(MediaError::NoSource);
        }

        // A new source silently stops whatever was playing
        self.source = Some(source.to_string());
        self.state = ElementState::Loading;
        self.position = 0.0;
        self.duration = 0.0;
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        match self.state {
            ElementState::Empty => return Err(MediaError::NoSource),
            ElementState::Loading => return Err(MediaError::NotReady),
            ElementState::Playing => return Ok(()),
            ElementState::Paused => {}
        }

        if let Some(reason) = &self.rejection {
            return Err(MediaError::Rejected(reason.clone()));
        }

        // Playing again after the end starts over
        if self.position >= self.duration {
            self.position = 0.0;
            self.emit(MediaEvent::TimeUpdated(0.0));
        }

        self.state = ElementState::Playing;
        self.emit(MediaEvent::Playing);
        Ok(())
    }

    fn pause(&mut self) {
        if self.state == ElementState::Playing {
            self.state = ElementState::Paused;
            self.emit(MediaEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) {
        if matches!(self.state, ElementState::Empty | ElementState::Loading) || !seconds.is_finite() {
            return;
        }

        self.position = seconds.clamp(0.0, self.duration);
        self.emit(MediaEvent::TimeUpdated(self.position));
    }

    fn set_volume(&mut self, volume: f64) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.state != ElementState::Playing
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn element() -> (SimulatedElement, UnboundedReceiver<MediaEvent>) {
        let (tx, rx) = unbounded_channel();
        (SimulatedElement::new(tx).with_length("a.mp4", 3.0), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<MediaEvent>) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_load_completes_on_next_tick() {
        let (mut element, mut rx) = element();

        element.load("a.mp4").unwrap();
        assert_eq!(ElementState::Loading, element.state());
        assert_eq!(Err(MediaError::NotReady), element.play());
        assert!(drain(&mut rx).is_empty());

        element.tick(Duration::from_millis(100));

        assert_eq!(
            vec![MediaEvent::MetadataLoaded { duration: 3.0 }, MediaEvent::CanPlay],
            drain(&mut rx)
        );
        assert_eq!(3.0, element.duration());
        assert!(element.is_paused());
    }

    #[test]
    fn test_play_until_ended() {
        let (mut element, mut rx) = element();
        element.load("a.mp4").unwrap();
        element.tick(Duration::ZERO);
        drain(&mut rx);

        element.play().unwrap();
        element.tick(Duration::from_secs(2));
        element.tick(Duration::from_secs(2));

        assert_eq!(
            vec![
                MediaEvent::Playing,
                MediaEvent::TimeUpdated(2.0),
                MediaEvent::TimeUpdated(3.0),
                MediaEvent::Ended,
            ],
            drain(&mut rx)
        );
        assert!(element.is_paused());
        assert_eq!(3.0, element.position());
    }

    #[test]
    fn test_play_without_source() {
        let (mut element, _rx) = element();

        assert_eq!(Err(MediaError::NoSource), element.play());
        assert_eq!(Err(MediaError::NoSource), element.load("  "));
    }

    #[test]
    fn test_rejected_play() {
        let (tx, _rx) = unbounded_channel();
        let mut element = SimulatedElement::new(tx).with_rejection("autoplay blocked");
        element.load("b.mp4").unwrap();
        element.tick(Duration::ZERO);

        assert_eq!(
            Err(MediaError::Rejected("autoplay blocked".to_string())),
            element.play()
        );
        assert_eq!(60.0, element.duration());
    }

    #[test]
    fn test_seek_is_clamped() {
        let (mut element, mut rx) = element();
        element.load("a.mp4").unwrap();
        element.tick(Duration::ZERO);
        drain(&mut rx);

        element.seek(10.0);
        element.seek(-1.0);

        assert_eq!(
            vec![MediaEvent::TimeUpdated(3.0), MediaEvent::TimeUpdated(0.0)],
            drain(&mut rx)
        );
    }
}
