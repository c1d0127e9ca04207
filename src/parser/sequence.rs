use crate::error::DecodeError;
use crate::model::{Frame, Sequence};
use crate::parser::context::DecodeContext;
use crate::parser::cursor::{Handled, Tag, TagCursor};
use crate::parser::frame::decode_frame;
use crate::parser::strings::decode_legacy_text;
use byteorder::{ByteOrder, LittleEndian};

pub const SEQUENCE_END: Tag = *b"PEND";
pub const FRAME_START: Tag = *b"FSTR";
pub const FRAME_ALLOCATE: Tag = *b"PFCN";

/// Frame counts above this are treated as a corrupt header
pub const MAX_FRAMES: usize = 4096;

/// Leaf encoding of the tag stream: the legacy tool writes effects and
/// conditions as fixed records instead of nested tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Native,
    Legacy,
}

/// "Slot `target_slot` of frame `target_frame` is the same rectangle as
/// slot `source_slot` of frame `source_frame`"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAlias {
    pub target_frame: usize,
    pub target_slot: u8,
    pub source_frame: usize,
    pub source_slot: u8,
}

/// Decodes one sequence body (everything between `PSTR <index>` and `PEND`)
/// and owns the hitbox alias queue until the sequence is closed.
pub struct SequenceAssembler {
    dialect: Dialect,
    index: usize,
    declared_frames: Option<usize>,
    decoded: Vec<bool>,
    aliases: Vec<PendingAlias>,
}

impl SequenceAssembler {
    pub fn new(dialect: Dialect, index: usize) -> Self {
        Self {
            dialect,
            index,
            declared_frames: None,
            decoded: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Fills `seq` from the stream. Whatever was decoded before an error is
    /// kept and its aliases are still resolved.
    pub fn decode(
        mut self,
        cursor: &mut TagCursor<'_>,
        seq: &mut Sequence,
        ctx: &mut DecodeContext,
    ) -> Result<(), DecodeError> {
        seq.clear();
        seq.initialized = true;
        let result = cursor.run_block(SEQUENCE_END, ctx, |tag, c, ctx| {
            self.sequence_tag(tag, c, seq, ctx)
        });
        self.finish(seq, ctx);
        result
    }

    fn sequence_tag(
        &mut self,
        tag: Tag,
        c: &mut TagCursor<'_>,
        seq: &mut Sequence,
        ctx: &mut DecodeContext,
    ) -> Result<Handled, DecodeError> {
        match tag {
            FRAME_ALLOCATE => {
                let count = c.read_u32()? as usize;
                self.allocate(count, seq, ctx);
            }
            FRAME_START => {
                let index = c.read_u32()? as usize;
                self.frame(index, c, seq, ctx)?;
            }
            _ => match &tag {
                b"PNM2" => seq.name = decode_legacy_text(c.read_blob()?),
                b"PCN2" => seq.code_name = decode_legacy_text(c.read_blob()?),
                b"PSTS" => seq.status = c.read_i32()?,
                b"PLVL" => seq.level = c.read_i32()?,
                b"PFLG" => seq.flags = c.read_i32()?,
                b"PDS2" => seq.extra_data = self.extra_words(c.read_blob()?),
                _ => return Ok(Handled::Unknown),
            },
        }
        Ok(Handled::Yes)
    }

    /// Opaque words; a ragged tail is zero-padded into one last word
    fn extra_words(&self, blob: &[u8]) -> Vec<i32> {
        let chunks = blob.chunks_exact(4);
        let tail = chunks.remainder();
        let mut words: Vec<i32> = chunks.map(LittleEndian::read_i32).collect();
        if !tail.is_empty() {
            log::warn!(
                "sequence {}: extra data is {} bytes, padding the last word",
                self.index,
                blob.len()
            );
            let mut last = [0u8; 4];
            last[..tail.len()].copy_from_slice(tail);
            words.push(LittleEndian::read_i32(&last));
        }
        words
    }

    fn allocate(&mut self, count: usize, seq: &mut Sequence, ctx: &mut DecodeContext) {
        if let Some(existing) = self.declared_frames {
            ctx.recover(
                DecodeError::field("frame-count-reallocated")
                    .with_arg("sequence", self.index)
                    .with_arg("declared", existing)
                    .with_arg("again", count),
            );
            return;
        }
        if count > MAX_FRAMES {
            ctx.recover(
                DecodeError::field("frame-count-too-large")
                    .with_arg("sequence", self.index)
                    .with_arg("count", count),
            );
            return;
        }
        seq.allocate(count);
        self.declared_frames = Some(count);
        self.decoded = vec![false; count];
    }

    fn frame(
        &mut self,
        index: usize,
        c: &mut TagCursor<'_>,
        seq: &mut Sequence,
        ctx: &mut DecodeContext,
    ) -> Result<(), DecodeError> {
        match self.declared_frames {
            Some(count) if index < count => {
                if self.decoded[index] {
                    log::debug!("sequence {}: frame {} decoded again", self.index, index);
                    self.aliases.retain(|alias| alias.target_frame != index);
                }
                let frame = &mut seq.frames[index];
                *frame = Frame::default();
                decode_frame(c, self.dialect, index, count, frame, &mut self.aliases, ctx)?;
                self.decoded[index] = true;
                return Ok(());
            }
            Some(count) => ctx.recover(
                DecodeError::field("frame-index-out-of-range")
                    .with_arg("sequence", self.index)
                    .with_arg("frame", index)
                    .with_arg("count", count),
            ),
            None => log::debug!(
                "sequence {}: frame {} before allocation, dropped",
                self.index,
                index
            ),
        }
        // Parse into scratch space so the stream stays in step
        let mut scratch = Frame::default();
        let mut scratch_aliases = Vec::new();
        decode_frame(c, self.dialect, index, 0, &mut scratch, &mut scratch_aliases, ctx)
    }

    /// Sequence-end barrier: every source rectangle is decoded by now
    fn finish(&mut self, seq: &mut Sequence, ctx: &mut DecodeContext) {
        let resolved = resolve_aliases(&mut self.aliases, seq);
        for alias in self.aliases.drain(..) {
            ctx.recover(
                DecodeError::field("unresolved-hitbox-alias")
                    .with_arg("sequence", self.index)
                    .with_arg("frame", alias.target_frame)
                    .with_arg("slot", alias.target_slot)
                    .with_arg("source_frame", alias.source_frame)
                    .with_arg("source_slot", alias.source_slot),
            );
        }

        let decoded = self.decoded.iter().filter(|&&done| done).count();
        if let Some(declared) = self.declared_frames {
            if decoded != declared {
                ctx.recover(
                    DecodeError::field("frame-count-mismatch")
                        .with_arg("sequence", self.index)
                        .with_arg("declared", declared)
                        .with_arg("decoded", decoded),
                );
            }
        }

        let report = ctx.report_mut();
        report.frames += decoded;
        report.resolved_aliases += resolved;
        log::debug!(
            "sequence {} '{}': {} frames, {} aliases resolved",
            self.index,
            seq.name,
            decoded,
            resolved
        );
    }
}

/// Copies source rectangles into alias targets, repeating until no alias
/// makes progress so alias-of-alias chains settle. Unresolvable aliases
/// stay in `pending`.
pub fn resolve_aliases(pending: &mut Vec<PendingAlias>, seq: &mut Sequence) -> usize {
    let mut resolved = 0;
    loop {
        let before = pending.len();
        pending.retain(|alias| {
            let source = seq
                .frames
                .get(alias.source_frame)
                .and_then(|frame| frame.hitboxes.get(&alias.source_slot))
                .copied();
            match (source, seq.frames.get_mut(alias.target_frame)) {
                (Some(rect), Some(target)) => {
                    target.hitboxes.insert(alias.target_slot, rect);
                    resolved += 1;
                    false
                }
                _ => true,
            }
        });
        if pending.is_empty() || pending.len() == before {
            return resolved;
        }
    }
}
