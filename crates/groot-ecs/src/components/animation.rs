use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Rect;

/// One pose of a clip: where to read it from the sprite sheet and how long
/// to hold it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub source: Rect,
    pub duration_ms: f64,
}

impl AnimationFrame {
    pub fn new(source: Rect, duration_ms: f64) -> Self {
        Self {
            source,
            duration_ms,
        }
    }
}

/// A named, ordered sequence of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, frames: Vec<AnimationFrame>, looping: bool) -> Self {
        Self {
            name: name.into(),
            frames,
            looping,
        }
    }

    /// Sum of every frame's duration.
    pub fn total_duration_ms(&self) -> f64 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}

/// Result of [`Animation::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback (re)started from frame 0.
    Started,
    /// The clip was already active and no restart was requested.
    AlreadyPlaying,
    /// No clip with that name; nothing changed.
    UnknownClip,
}

/// Frame-based sprite animation: a clip library plus playback state.
///
/// Clips are keyed by name in a `BTreeMap` so iteration (and therefore
/// serialization) order is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    pub clips: BTreeMap<String, AnimationClip>,
    pub current_clip: Option<String>,
    pub current_frame: usize,
    /// Time spent on the current frame, in milliseconds.
    pub elapsed_ms: f64,
    pub playing: bool,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_clip`](Self::add_clip).
    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.add_clip(clip);
        self
    }

    /// Register `clip`, replacing any clip with the same name.
    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Start playing `name` from its first frame.
    ///
    /// Requesting the clip that is already active is a no-op unless
    /// `restart` is set. An unknown name is logged and leaves the playback
    /// state untouched.
    pub fn play(&mut self, name: &str, restart: bool) -> PlayOutcome {
        if self.current_clip.as_deref() == Some(name) && !restart {
            return PlayOutcome::AlreadyPlaying;
        }
        if !self.clips.contains_key(name) {
            tracing::warn!(clip = name, "animation clip not found");
            return PlayOutcome::UnknownClip;
        }
        self.current_clip = Some(name.to_owned());
        self.current_frame = 0;
        self.elapsed_ms = 0.0;
        self.playing = true;
        PlayOutcome::Started
    }

    /// Halt playback and rewind to the first frame. The clip stays selected.
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame = 0;
        self.elapsed_ms = 0.0;
    }

    /// The active clip, if one is selected and still registered.
    pub fn active_clip(&self) -> Option<&AnimationClip> {
        self.current_clip.as_ref().and_then(|name| self.clips.get(name))
    }

    /// The frame to display right now, if any.
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        self.active_clip()?.frames.get(self.current_frame)
    }
}
