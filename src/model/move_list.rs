use super::Sequence;
use serde::{Deserialize, Serialize};

/// Historical upper bound of the sequence table
pub const DEFAULT_TABLE_SIZE: usize = 1000;

/// How a decode treats sequences already present in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeMode {
    /// Clear the table and size it to the file
    #[default]
    Replace,
    /// Keep existing sequences; the file overwrites only the slots it carries
    Patch,
}

/// The sequence table every decoder populates. Slot index is the sequence id;
/// unused slots stay in place as empty sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveList {
    pub sequences: Vec<Sequence>,
}

impl MoveList {
    pub fn with_size(size: usize) -> Self {
        let mut sequences = Vec::with_capacity(size);
        sequences.resize_with(size, Sequence::default);
        Self { sequences }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sequence> {
        self.sequences.get_mut(index)
    }

    /// Prepares the table for a file declaring `count` sequences
    pub fn prepare(&mut self, count: usize, mode: MergeMode) {
        match mode {
            MergeMode::Replace => {
                self.sequences.clear();
                self.sequences.resize_with(count, Sequence::default);
            }
            MergeMode::Patch => {
                if self.sequences.len() < count {
                    self.sequences.resize_with(count, Sequence::default);
                }
            }
        }
    }

    /// Non-empty sequences with their ids
    pub fn initialized(&self) -> impl Iterator<Item = (usize, &Sequence)> {
        self.sequences
            .iter()
            .enumerate()
            .filter(|(_, seq)| seq.initialized)
    }
}
