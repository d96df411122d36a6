// ==========================================
// PLAYER STATE
// ==========================================
// The selection and transport state of the player, plus the pure update
// functions that move it forward.
//
// Every update takes the current state by reference and returns a
// Transition: the new state and the commands the media element must run
// to match it. Nothing in here touches a real media element, so every
// rule can be checked with plain asserts.
//
// Lifecycle of the current video:
//   Idle → Loading → Loaded → Playing ⇄ Paused
//                      ↑                  │
//                      └── Ended (next) ←─┘

use crate::error::{PlayerError, Result};
use crate::player::media::{MediaCommand, MediaEvent};
use crate::player::playlist::{Playlist, VideoDescriptor};

/// Coarse lifecycle of the selected video, derived from `PlayerState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet
    Idle,
    /// Source requested, element has not reported it can play
    Loading,
    /// Ready and has not played yet
    Loaded,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    selected: Option<usize>,
    is_playing: bool,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    // Element reported CanPlay for the current source
    ready: bool,
    // Play was requested before the element was ready
    pending_play: bool,
    // Element reported Playing at least once for the current source
    started: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState {
            selected: None,
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            ready: false,
            pending_play: false,
            started: false,
        }
    }
}

impl PlayerState {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The selected descriptor, looked up in `playlist`.
    pub fn selected_video<'a>(&self, playlist: &'a Playlist) -> Option<&'a VideoDescriptor> {
        self.selected.and_then(|index| playlist.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_play_pending(&self) -> bool {
        self.pending_play
    }

    pub fn phase(&self) -> Phase {
        if self.selected.is_none() {
            Phase::Idle
        } else if self.is_playing && self.ready {
            Phase::Playing
        } else if !self.ready {
            Phase::Loading
        } else if self.started || self.position > 0.0 {
            Phase::Paused
        } else {
            Phase::Loaded
        }
    }

    /// Fraction of the video already played, 0.0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        seconds.clamp(0.0, self.duration)
    }
}

/// A new state and the commands that bring the media element in line with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: PlayerState,
    pub commands: Vec<MediaCommand>,
}

impl Transition {
    fn new(state: PlayerState, commands: Vec<MediaCommand>) -> Self {
        Transition { state, commands }
    }

    fn unchanged(state: &PlayerState) -> Self {
        Transition::new(state.clone(), Vec::new())
    }
}

/// Everything that can move the player state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Select a video by id
    Select(String),
    SelectNext,
    SelectPrevious,
    TogglePlayPause,
    SeekBy(f64),
    SeekTo(f64),
    SetVolume(f64),
    ToggleMute,
    /// A notification from the media element
    Media(MediaEvent),
}

/// Selects the first video of the playlist.
pub fn init(playlist: &Playlist) -> Transition {
    select_index(&PlayerState::default(), playlist, 0)
}

// Shared by every selection path: the new source starts from scratch.
fn select_index(state: &PlayerState, playlist: &Playlist, index: usize) -> Transition {
    let Some(video) = playlist.get(index) else {
        return Transition::unchanged(state);
    };

    let next = PlayerState {
        selected: Some(index),
        is_playing: false,
        position: 0.0,
        duration: 0.0,
        ready: false,
        pending_play: false,
        started: false,
        ..state.clone()
    };

    Transition::new(next, vec![MediaCommand::Load(video.source.clone())])
}

pub fn select_video(state: &PlayerState, playlist: &Playlist, id: &str) -> Result<Transition> {
    let index = playlist
        .index_of(id)
        .ok_or_else(|| PlayerError::UnknownVideo(id.to_string()))?;

    Ok(select_index(state, playlist, index))
}

pub fn select_next(state: &PlayerState, playlist: &Playlist) -> Transition {
    let index = state.selected.map(|i| playlist.next_index(i)).unwrap_or(0);
    select_index(state, playlist, index)
}

pub fn select_previous(state: &PlayerState, playlist: &Playlist) -> Transition {
    let index = state.selected.map(|i| playlist.previous_index(i)).unwrap_or(0);
    select_index(state, playlist, index)
}

/// Pauses when playing, otherwise starts playback.
///
/// If the element is not ready yet the play request is parked and issued
/// on the next `CanPlay`.
pub fn toggle_play_pause(state: &PlayerState) -> Transition {
    if state.selected.is_none() {
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    let mut commands = Vec::new();

    if state.is_playing {
        next.is_playing = false;
        next.pending_play = false;
        if state.ready {
            commands.push(MediaCommand::Pause);
        }
    } else {
        next.is_playing = true;
        if state.ready {
            commands.push(MediaCommand::Play);
        } else {
            next.pending_play = true;
        }
    }

    Transition::new(next, commands)
}

/// Moves the position by `delta` seconds, clamped to [0, duration].
pub fn seek_by(state: &PlayerState, delta: f64) -> Transition {
    if !delta.is_finite() {
        return Transition::unchanged(state);
    }
    seek_to(state, state.position + delta)
}

/// Jumps to an absolute position, clamped to [0, duration].
pub fn seek_to(state: &PlayerState, seconds: f64) -> Transition {
    if state.selected.is_none() || !seconds.is_finite() {
        return Transition::unchanged(state);
    }

    let target = state.clamp_position(seconds);
    let next = PlayerState {
        position: target,
        ..state.clone()
    };

    Transition::new(next, vec![MediaCommand::Seek(target)])
}

/// Sets the volume. Zero also mutes; raising it again does not unmute.
pub fn set_volume(state: &PlayerState, volume: f64) -> Transition {
    if !volume.is_finite() {
        return Transition::unchanged(state);
    }

    let volume = volume.clamp(0.0, 1.0);
    let mut next = state.clone();
    let mut commands = vec![MediaCommand::SetVolume(volume)];
    next.volume = volume;

    if volume == 0.0 {
        next.muted = true;
        commands.push(MediaCommand::SetMuted(true));
    }

    Transition::new(next, commands)
}

pub fn toggle_mute(state: &PlayerState) -> Transition {
    let next = PlayerState {
        muted: !state.muted,
        ..state.clone()
    };
    let commands = vec![MediaCommand::SetMuted(next.muted)];

    Transition::new(next, commands)
}

/// Folds a media element notification into the state.
///
/// Notifications carry no source identity. Until the current source reports
/// `CanPlay`, time, transport and end notifications can only belong to the
/// previous source and are dropped.
pub fn on_media_event(state: &PlayerState, playlist: &Playlist, event: &MediaEvent) -> Transition {
    let mut next = state.clone();
    let mut commands = Vec::new();

    match event {
        MediaEvent::TimeUpdated(_) | MediaEvent::Playing | MediaEvent::Paused | MediaEvent::Ended
            if !state.ready =>
        {
            return Transition::unchanged(state);
        }
        MediaEvent::TimeUpdated(seconds) => {
            if seconds.is_finite() {
                next.position = seconds.max(0.0);
            }
        }
        MediaEvent::MetadataLoaded { duration } => {
            if duration.is_finite() && *duration >= 0.0 {
                next.duration = *duration;
                next.position = next.clamp_position(next.position);
            }
        }
        MediaEvent::CanPlay => {
            next.ready = true;
            if next.pending_play {
                next.pending_play = false;
                commands.push(MediaCommand::Play);
            }
        }
        MediaEvent::Ended => return advance(state, playlist),
        MediaEvent::Playing => {
            next.is_playing = true;
            next.started = true;
        }
        MediaEvent::Paused | MediaEvent::PlaybackFailed { .. } => {
            next.is_playing = false;
            next.pending_play = false;
        }
    }

    Transition::new(next, commands)
}

// Auto-advance: load the next video (wrapping) and keep playing once it
// reports CanPlay.
fn advance(state: &PlayerState, playlist: &Playlist) -> Transition {
    let Some(current) = state.selected else {
        return Transition::unchanged(state);
    };

    let mut transition = select_index(state, playlist, playlist.next_index(current));
    transition.state.is_playing = true;
    transition.state.pending_play = true;
    transition
}

/// Single entry point used by the controller.
pub fn reduce(state: &PlayerState, playlist: &Playlist, action: &Action) -> Result<Transition> {
    let transition = match action {
        Action::Select(id) => select_video(state, playlist, id)?,
        Action::SelectNext => select_next(state, playlist),
        Action::SelectPrevious => select_previous(state, playlist),
        Action::TogglePlayPause => toggle_play_pause(state),
        Action::SeekBy(delta) => seek_by(state, *delta),
        Action::SeekTo(seconds) => seek_to(state, *seconds),
        Action::SetVolume(volume) => set_volume(state, *volume),
        Action::ToggleMute => toggle_mute(state),
        Action::Media(event) => on_media_event(state, playlist, event),
    };

    Ok(transition)
}
