use super::Frame;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub code_name: String,
    pub status: i32,
    pub level: i32,
    pub flags: i32,
    /// Extended data block carried through without interpretation
    pub extra_data: Vec<i32>,
    pub frames: Vec<Frame>,
    /// Set by editors; decoders always clear it
    #[serde(skip)]
    pub modified: bool,
    /// False for empty table slots
    pub initialized: bool,
}

impl Sequence {
    pub fn is_empty(&self) -> bool {
        !self.initialized
    }

    /// Resets the slot to the empty state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Commits the frame count; frames past it are discarded
    pub fn allocate(&mut self, frame_count: usize) {
        self.frames.clear();
        self.frames.resize_with(frame_count, Frame::default);
        self.initialized = true;
    }
}
