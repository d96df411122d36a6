//! Video playlist player.
//!
//! The playlist and transport state live in [`player::state`] as plain data
//! moved forward by pure update functions. [`player::controller`] applies the
//! resulting commands to anything implementing [`player::media::MediaElement`].

pub mod config;
pub mod error;
pub mod player;

pub use config::AppConfig;
pub use error::{MediaError, PlayerError};
pub use player::controller::Controller;
pub use player::media::{MediaCommand, MediaElement, MediaEvent};
pub use player::playlist::{Playlist, VideoDescriptor};
pub use player::simulated::SimulatedElement;
pub use player::state::{Action, Phase, PlayerState, Transition};
