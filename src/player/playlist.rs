// ==========================================
// PLAYLIST MODULE
// ==========================================
// This module holds the fixed list of videos the player can show.
// It handles:
// - Describing a single video (VideoDescriptor)
// - Validating the list once at startup (non-empty, unique ids)
// - Walking the list in order (next/previous with wrap-around)
//
// Unlike a play queue, nothing is ever removed from the playlist.
// Tracks stay where they are and the "current" video is just an index
// kept by the player state (see state.rs).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};

// ==========================================
// VIDEO DESCRIPTOR
// ==========================================
// Static metadata for one playable video.
//
// Fields:
// - id: unique key inside the playlist ("video01")
// - title: what the list shows
// - source: locator handed to the media element on load
// - thumbnail: locator of a still image, carried as data only
// - display_duration: pre-formatted "mm:ss" label, NOT authoritative.
//   The real duration arrives from the media element as metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub id: String,
    pub title: String,
    pub source: String,
    pub thumbnail: String,
    pub display_duration: String,
}

impl VideoDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        thumbnail: impl Into<String>,
        display_duration: impl Into<String>,
    ) -> Self {
        VideoDescriptor {
            id: id.into(),
            title: title.into(),
            source: source.into(),
            thumbnail: thumbnail.into(),
            display_duration: display_duration.into(),
        }
    }

    /// Parses the display label ("mm:ss" or "hh:mm:ss") into seconds.
    ///
    /// Returns `None` for anything that isn't a clean clock label.
    pub fn display_seconds(&self) -> Option<f64> {
        let mut total: u64 = 0;
        let mut parts = 0;
        for part in self.display_duration.trim().split(':') {
            let value: u64 = part.parse().ok()?;
            // Only the leading component may exceed 59
            if parts > 0 && value >= 60 {
                return None;
            }
            total = total.checked_mul(60)?.checked_add(value)?;
            parts += 1;
        }
        if (2..=3).contains(&parts) {
            Some(total as f64)
        } else {
            None
        }
    }
}

// ==========================================
// PLAYLIST STRUCT
// ==========================================
// An ordered, immutable list of descriptors.
//
// Why a Vec and not a VecDeque?
// - We never pop from either end
// - Navigation is index based: next = (i + 1) % len
// - Vec gives O(1) indexing which is all we need
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    videos: Vec<VideoDescriptor>,
}

impl Playlist {
    // ==========================================
    // CONSTRUCTOR: new()
    // ==========================================
    // Validates and wraps the list.
    //
    // Fails when:
    // - the list is empty (there would be nothing to select)
    // - two descriptors share an id (selection by id would be ambiguous)
    pub fn new(videos: Vec<VideoDescriptor>) -> Result<Self> {
        if videos.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }

        let mut seen = HashSet::new();
        for video in &videos {
            if !seen.insert(video.id.as_str()) {
                return Err(PlayerError::DuplicateVideoId(video.id.clone()));
            }
        }

        Ok(Playlist { videos })
    }

    pub fn get(&self, index: usize) -> Option<&VideoDescriptor> {
        self.videos.get(index)
    }

    /// Position of the video with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.videos.iter().position(|video| video.id == id)
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    // A validated playlist is never empty, but clippy expects the pair
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoDescriptor> {
        self.videos.iter()
    }

    // ==========================================
    // NAVIGATION: next_index()
    // ==========================================
    // The index that follows `index`, wrapping to the first entry after
    // the last one.
    //
    // Example with 3 videos:
    // - next_index(0) → 1
    // - next_index(2) → 0
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.videos.len()
    }

    // ==========================================
    // NAVIGATION: previous_index()
    // ==========================================
    // Mirror of next_index(): wraps from the first entry to the last.
    pub fn previous_index(&self, index: usize) -> usize {
        if index == 0 || index >= self.videos.len() {
            self.videos.len() - 1
        } else {
            index - 1
        }
    }
}
