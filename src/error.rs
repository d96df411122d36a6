// Error types shared by the playlist, the state core and the media seam.

use thiserror::Error;

/// Result alias used by the player modules.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Failures reported by a media element.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MediaError {
    #[error("no media source has been loaded")]
    NoSource,
    #[error("media source is not ready to play yet")]
    NotReady,
    #[error("playback was rejected, {0}")]
    Rejected(String),
}

/// Player errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlayerError {
    #[error("the playlist must contain at least one video")]
    EmptyPlaylist,
    #[error("video id {0} appears more than once in the playlist")]
    DuplicateVideoId(String),
    #[error("video {0} is not part of the playlist")]
    UnknownVideo(String),
    #[error(transparent)]
    Media(#[from] MediaError),
}
