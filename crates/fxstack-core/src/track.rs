//! Tracks, clip positions and sequence compositing mode.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::SharedClip;

/// How a sequence composites its tracks.
///
/// Alpha filters only have a visible effect outside standard full-track mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositingMode {
    #[default]
    TopDownFreeMove,
    StandardAutoFollow,
    StandardFullTrack,
}

/// Where a clip sits: its track and index on that track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipLocation {
    pub track_id: Uuid,
    pub clip_index: usize,
}

impl ClipLocation {
    pub fn new(track_id: Uuid, clip_index: usize) -> Self {
        Self {
            track_id,
            clip_index,
        }
    }
}

/// A track containing clips.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track ID
    pub id: Uuid,
    /// Track name
    pub name: String,
    /// Clips in timeline order
    pub clips: Vec<SharedClip>,
}

impl Track {
    /// Create a new video track.
    pub fn new_video(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            clips: Vec::new(),
        }
    }

    /// Add a clip to the end of the track. Returns its location.
    pub fn append_clip(&mut self, clip: SharedClip) -> ClipLocation {
        self.clips.push(clip);
        ClipLocation::new(self.id, self.clips.len() - 1)
    }

    /// Get the clip at the given index.
    pub fn clip_at(&self, index: usize) -> Option<&SharedClip> {
        self.clips.get(index)
    }

    /// Location of `clip` on this track, by identity.
    pub fn location_of(&self, clip: &SharedClip) -> Option<ClipLocation> {
        self.clips
            .iter()
            .position(|c| Arc::ptr_eq(c, clip))
            .map(|i| ClipLocation::new(self.id, i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{shared_clip, Clip};

    #[test]
    fn append_reports_location() {
        let mut track = Track::new_video("V1");
        let a = shared_clip(Clip::new("a"));
        let b = shared_clip(Clip::new("b"));
        track.append_clip(a.clone());
        let loc = track.append_clip(b.clone());

        assert_eq!(loc, ClipLocation::new(track.id, 1));
        assert_eq!(track.location_of(&a), Some(ClipLocation::new(track.id, 0)));
        assert!(Arc::ptr_eq(track.clip_at(1).unwrap(), &b));
    }
}
