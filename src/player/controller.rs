//! Transport-control bridge between the player state and a media element.
//!
//! The controller owns the playlist, the current [`PlayerState`] and
//! (optionally) a media element. Every user action and every element
//! notification goes through [`Controller::dispatch`], which runs the pure
//! reducer and then applies the resulting commands to the element.
//!
//! Failures of the element are not surfaced to the caller: they are logged
//! and fed back as [`MediaEvent::PlaybackFailed`] so `is_playing` matches
//! what the element is really doing.

use std::collections::VecDeque;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::player::media::{MediaCommand, MediaElement, MediaEvent};
use crate::player::playlist::{Playlist, VideoDescriptor};
use crate::player::state::{self, Action, PlayerState, Transition};

pub struct Controller<E: MediaElement> {
    playlist: Playlist,
    state: PlayerState,
    element: Option<E>,
}

impl<E: MediaElement> Controller<E> {
    /// Creates an idle controller without a media element.
    pub fn new(playlist: Playlist) -> Self {
        Controller {
            playlist,
            state: PlayerState::default(),
            element: None,
        }
    }

    /// Attaches the element and brings it in line with the current state.
    ///
    /// The first attach selects the first video. A later attach reloads the
    /// selected video from the start.
    pub fn attach(&mut self, element: E) -> Result<()> {
        self.element = Some(element);

        let mut commands = vec![
            MediaCommand::SetVolume(self.state.volume()),
            MediaCommand::SetMuted(self.state.is_muted()),
        ];
        let transition = match self.state.selected() {
            None => state::init(&self.playlist),
            Some(_) => {
                let id = self.current_id();
                state::select_video(&self.state, &self.playlist, &id)?
            }
        };
        commands.extend(transition.commands);

        self.log_selection(&transition.state);
        self.state = transition.state;
        if let Err(err) = self.run_commands(commands) {
            self.dispatch(Action::Media(MediaEvent::PlaybackFailed {
                reason: err.to_string(),
            }))?;
        }
        Ok(())
    }

    /// Removes the element; actions become no-ops until the next attach.
    pub fn detach(&mut self) -> Option<E> {
        self.element.take()
    }

    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }

    pub fn element_mut(&mut self) -> Option<&mut E> {
        self.element.as_mut()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current(&self) -> Option<&VideoDescriptor> {
        self.state.selected_video(&self.playlist)
    }

    /// Runs an action through the reducer and applies its commands.
    ///
    /// Without an attached element this does nothing.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if self.element.is_none() {
            debug!(?action, "no media element attached, ignoring action");
            return Ok(());
        }

        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            let transition = state::reduce(&self.state, &self.playlist, &action)?;
            if let Some(failure) = self.apply(transition) {
                pending.push_back(Action::Media(failure));
            }
        }

        Ok(())
    }

    /// Dispatches every notification already waiting in `events`.
    ///
    /// Returns how many were handled.
    pub fn drain(&mut self, events: &mut UnboundedReceiver<MediaEvent>) -> Result<usize> {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.dispatch(Action::Media(event))?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Waits for notifications until `until` holds for the state or the
    /// channel closes.
    pub async fn pump<F>(&mut self, events: &mut UnboundedReceiver<MediaEvent>, until: F) -> Result<()>
    where
        F: Fn(&PlayerState) -> bool,
    {
        while !until(&self.state) {
            match events.recv().await {
                Some(event) => self.dispatch(Action::Media(event))?,
                None => break,
            }
        }
        Ok(())
    }

    // Stores the new state and runs the commands. Returns the failure to
    // feed back into the reducer, if any.
    fn apply(&mut self, transition: Transition) -> Option<MediaEvent> {
        let Transition { state, commands } = transition;
        let advanced = self.state.selected() != state.selected() && state.is_playing();

        if advanced {
            if let Some(video) = state.selected_video(&self.playlist) {
                info!(id = %video.id, title = %video.title, "advancing to next video");
            }
        } else {
            self.log_selection(&state);
        }
        self.state = state;

        self.run_commands(commands).err().map(|err| MediaEvent::PlaybackFailed {
            reason: err.to_string(),
        })
    }

    fn run_commands(&mut self, commands: Vec<MediaCommand>) -> Result<()> {
        let Some(element) = self.element.as_mut() else {
            return Ok(());
        };

        for command in &commands {
            debug!(?command, "applying media command");
            if let Err(err) = element.apply(command) {
                warn!(?command, error = %err, "media element rejected command");
                return Err(err.into());
            }
        }

        Ok(())
    }

    fn log_selection(&self, next: &PlayerState) {
        if self.state.selected() == next.selected() {
            return;
        }
        if let Some(video) = next.selected_video(&self.playlist) {
            info!(id = %video.id, title = %video.title, "selected video");
        }
    }

    fn current_id(&self) -> String {
        self.current().map(|video| video.id.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use crate::player::state::Phase;

    // Records commands instead of playing anything
    #[derive(Default)]
    struct RecordingElement {
        commands: Vec<MediaCommand>,
        refuse_play: bool,
    }

    impl MediaElement for RecordingElement {
        fn load(&mut self, source: &str) -> std::result::Result<(), MediaError> {
            self.commands.push(MediaCommand::Load(source.to_string()));
            Ok(())
        }

        fn play(&mut self) -> std::result::Result<(), MediaError> {
            if self.refuse_play {
                return Err(MediaError::Rejected("autoplay".to_string()));
            }
            self.commands.push(MediaCommand::Play);
            Ok(())
        }

        fn pause(&mut self) {
            self.commands.push(MediaCommand::Pause);
        }

        fn seek(&mut self, seconds: f64) {
            self.commands.push(MediaCommand::Seek(seconds));
        }

        fn set_volume(&mut self, volume: f64) {
            self.commands.push(MediaCommand::SetVolume(volume));
        }

        fn set_muted(&mut self, muted: bool) {
            self.commands.push(MediaCommand::SetMuted(muted));
        }

        fn position(&self) -> f64 {
            0.0
        }

        fn duration(&self) -> f64 {
            0.0
        }

        fn is_paused(&self) -> bool {
            true
        }

        fn volume(&self) -> f64 {
            1.0
        }

        fn is_muted(&self) -> bool {
            false
        }
    }

    fn playlist() -> Playlist {
        Playlist::new(vec![
            VideoDescriptor::new("one", "One", "one.mp4", "one.jpg", "00:10"),
            VideoDescriptor::new("two", "Two", "two.mp4", "two.jpg", "00:20"),
        ])
        .unwrap()
    }

    #[test]
    fn test_attach_initialises_element() {
        let mut controller = Controller::new(playlist());

        controller.attach(RecordingElement::default()).unwrap();

        assert_eq!(Some(0), controller.state().selected());
        assert_eq!(
            vec![
                MediaCommand::SetVolume(1.0),
                MediaCommand::SetMuted(false),
                MediaCommand::Load("one.mp4".to_string()),
            ],
            controller.element().unwrap().commands
        );
    }

    #[test]
    fn test_dispatch_without_element_is_noop() {
        let mut controller: Controller<RecordingElement> = Controller::new(playlist());

        controller.dispatch(Action::TogglePlayPause).unwrap();
        controller.dispatch(Action::SetVolume(0.0)).unwrap();

        assert_eq!(&PlayerState::default(), controller.state());
    }

    #[test]
    fn test_rejected_play_reconciles_state() {
        let mut controller = Controller::new(playlist());
        controller
            .attach(RecordingElement {
                refuse_play: true,
                ..Default::default()
            })
            .unwrap();
        controller.dispatch(Action::Media(MediaEvent::CanPlay)).unwrap();

        controller.dispatch(Action::TogglePlayPause).unwrap();

        assert!(!controller.state().is_playing());
        assert_eq!(Phase::Loaded, controller.state().phase());
    }

    #[test]
    fn test_detach_and_reattach_reloads_selection() {
        let mut controller = Controller::new(playlist());
        controller.attach(RecordingElement::default()).unwrap();
        controller.dispatch(Action::SelectNext).unwrap();

        let detached = controller.detach().unwrap();
        assert_eq!(
            Some(&MediaCommand::Load("two.mp4".to_string())),
            detached.commands.last()
        );

        controller.attach(RecordingElement::default()).unwrap();
        assert_eq!(Some(1), controller.state().selected());
        assert_eq!(
            Some(&MediaCommand::Load("two.mp4".to_string())),
            controller.element().unwrap().commands.last()
        );
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let mut controller = Controller::new(playlist());
        controller.attach(RecordingElement::default()).unwrap();

        let result = controller.dispatch(Action::Select("three".to_string()));

        assert!(result.is_err());
        assert_eq!(Some(0), controller.state().selected());
    }
}
