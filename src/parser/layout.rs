use crate::error::DecodeError;
use std::ops::Range;

/// Arrays a packed sequence can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Frames,
    Hitboxes,
    Effects,
    Conditions,
    Vectors,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Frames,
        SectionKind::Hitboxes,
        SectionKind::Effects,
        SectionKind::Conditions,
        SectionKind::Vectors,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Frames => "frames",
            Self::Hitboxes => "hitboxes",
            Self::Effects => "effects",
            Self::Conditions => "conditions",
            Self::Vectors => "vectors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub offset: usize,
    pub len: usize,
}

/// Explicit (offset, length) per section. The format stores start offsets
/// only, so each extent runs to the nearest other declared start above it,
/// or to the end of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    sections: [Option<Section>; 5],
}

impl SectionLayout {
    /// `declared` is indexed like `SectionKind::ALL`; offsets are relative to
    /// the sequence start and must already lie inside `sequence_len`.
    pub fn compute(declared: [Option<usize>; 5], sequence_len: usize) -> Self {
        let mut sections = [None; 5];
        for (slot, offset) in declared.iter().enumerate() {
            let Some(offset) = *offset else { continue };
            let end = declared
                .iter()
                .flatten()
                .copied()
                .filter(|&other| other > offset)
                .min()
                .unwrap_or(sequence_len)
                .min(sequence_len);
            sections[slot] = Some(Section {
                offset,
                len: end.saturating_sub(offset),
            });
        }
        Self { sections }
    }

    pub fn get(&self, kind: SectionKind) -> Option<Section> {
        self.sections[kind.slot()]
    }

    /// How many whole records of `size` bytes fit in the section
    pub fn capacity(&self, kind: SectionKind, size: usize) -> usize {
        self.get(kind).map_or(0, |s| s.len / size)
    }

    /// Byte range of record `index`, rejected unless it lies entirely within
    /// the inferred extent
    pub fn record(
        &self,
        kind: SectionKind,
        index: usize,
        size: usize,
    ) -> Result<Range<usize>, DecodeError> {
        let section = self.get(kind).ok_or_else(|| {
            DecodeError::field("section-absent")
                .with_arg("section", kind.name())
                .with_arg("index", index)
        })?;
        let start = index.checked_mul(size).filter(|&rel| rel < section.len);
        match start {
            Some(rel) if rel + size <= section.len => {
                Ok(section.offset + rel..section.offset + rel + size)
            }
            _ => Err(DecodeError::field("record-outside-section")
                .with_arg("section", kind.name())
                .with_arg("index", index)
                .with_arg("extent", section.len)),
        }
    }
}
