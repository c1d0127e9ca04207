use crate::error::DecodeError;
use crate::model::{
    Attack, BlendMode, FlowType, Frame, HITBOX_SLOT_COUNT, Hitbox, HitboxKind, MoveList, Sequence,
    SpriteRef, Stance,
};
use crate::parser::context::DecodeContext;
use crate::parser::detect::PACKED_MAGIC;
use crate::parser::layout::{SectionKind, SectionLayout};
use crate::parser::names::default_name;
use crate::parser::records::{LEAF_RECORD_SIZE, read_condition_record, read_effect_record};
use crate::parser::sequence::MAX_FRAMES;
use crate::parser::strings::{NAME_RECORD_SIZE, decode_name_record};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::ops::Range;

pub const PACKED_HEADER_SIZE: usize = 0x40;
pub const OFFSET_TABLE_ENTRIES: usize = 256;
pub const ANIM_DATA_START: usize = PACKED_HEADER_SIZE + OFFSET_TABLE_ENTRIES * 4;
pub const SEQUENCE_HEADER_SIZE: usize = 68;
pub const FRAME_RECORD_SIZE: usize = 216;
pub const HITBOX_RECORD_SIZE: usize = 20;
pub const VECTOR_RECORD_SIZE: usize = 32;
/// Sprite values at or above this are pattern references (or, in CSEL
/// sequences, sprites offset by this amount)
pub const PATTERN_REFERENCE_BASE: i32 = 10000;
/// Hitbox records with a kind at or above this are attack boxes
pub const ATTACK_KIND_MIN: i32 = 100;
pub const EMBEDDED_ATLAS_MAGIC: &[u8; 8] = b"SPRPACK1";

const EFFECT_INDEX_COUNT: usize = 8;
const CONDITION_INDEX_COUNT: usize = 8;
const VECTOR_INDEX_COUNT: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedHeader {
    pub version: u32,
    pub anim_size: usize,
    pub image_size: usize,
}

impl PackedHeader {
    pub fn read(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < ANIM_DATA_START {
            return Err(DecodeError::fatal("packed-header-truncated").with_arg("length", buf.len()));
        }
        if &buf[..PACKED_MAGIC.len()] != PACKED_MAGIC {
            return Err(DecodeError::fatal("bad-packed-magic"));
        }
        let mut rdr = Cursor::new(&buf[PACKED_MAGIC.len()..PACKED_HEADER_SIZE]);
        let version = rdr.read_u32::<LittleEndian>()?;
        let anim_size = rdr.read_u32::<LittleEndian>()? as usize;
        let _reserved = rdr.read_u32::<LittleEndian>()?;
        let anim_size_dup = rdr.read_u32::<LittleEndian>()? as usize;
        let image_size = rdr.read_u32::<LittleEndian>()? as usize;
        if anim_size != anim_size_dup {
            log::warn!(
                "packed header animation sizes disagree ({} vs {}), using the smaller",
                anim_size,
                anim_size_dup
            );
        }
        Ok(Self {
            version,
            anim_size: anim_size.min(anim_size_dup),
            image_size,
        })
    }

    pub fn image_span(&self) -> Range<usize> {
        let start = ANIM_DATA_START.saturating_add(self.anim_size);
        start..start.saturating_add(self.image_size)
    }

    pub fn names_start(&self) -> usize {
        self.image_span().end
    }
}

/// Absolute sequence offsets; -1 and 0 mark unused slots
pub fn read_offset_table(buf: &[u8]) -> Result<Vec<Option<usize>>, DecodeError> {
    let table = buf
        .get(PACKED_HEADER_SIZE..ANIM_DATA_START)
        .ok_or_else(|| DecodeError::fatal("offset-table-truncated"))?;
    let mut rdr = Cursor::new(table);
    let mut offsets = Vec::with_capacity(OFFSET_TABLE_ENTRIES);
    for _ in 0..OFFSET_TABLE_ENTRIES {
        let raw = rdr.read_i32::<LittleEndian>().map_err(|e| DecodeError::from(e).escalate())?;
        offsets.push(if raw > 0 { Some(raw as usize) } else { None });
    }
    Ok(offsets)
}

pub fn decode_sprite(raw: i32, csel: bool) -> SpriteRef {
    match raw {
        r if r < 0 => SpriteRef::None,
        r if r >= PATTERN_REFERENCE_BASE && csel => SpriteRef::Sprite(r - PATTERN_REFERENCE_BASE),
        r if r >= PATTERN_REFERENCE_BASE => SpriteRef::Pattern(r - PATTERN_REFERENCE_BASE),
        r => SpriteRef::Sprite(r),
    }
}

/// Legacy 0..=5 animation flow onto (flow, landing frame)
pub fn map_flow(raw: u32, jump: i32) -> (FlowType, i32) {
    match raw {
        0 => (FlowType::EndToPattern, -1),
        1 => (FlowType::Next, -1),
        2 => (FlowType::JumpToFrame, -1),
        3 => (FlowType::Next, jump),
        4 => (FlowType::JumpToFrame, jump),
        // loop check has no canonical equivalent
        5 => (FlowType::Next, -1),
        other => {
            log::warn!("Unknown packed flow value: {}, treating as next", other);
            (FlowType::Next, -1)
        }
    }
}

/// Decodes a whole packed file. The header and offset table are the only
/// fatal checks; each sequence stands or falls on its own.
pub fn decode_packed(
    buf: &[u8],
    table: &mut MoveList,
    ctx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    let header = PackedHeader::read(buf)?;
    let offsets = read_offset_table(buf)?;
    if OFFSET_TABLE_ENTRIES > ctx.opts.table_size {
        return Err(DecodeError::fatal("sequence-count-too-large")
            .with_arg("count", OFFSET_TABLE_ENTRIES)
            .with_arg("table_size", ctx.opts.table_size));
    }
    log::info!(
        "packed move list v{}: {} bytes of animation data, {} bytes of image data",
        header.version,
        header.anim_size,
        header.image_size
    );
    table.prepare(OFFSET_TABLE_ENTRIES, ctx.opts.merge);

    let mut decoded = Vec::new();
    for (index, offset) in offsets.iter().enumerate() {
        let Some(offset) = *offset else { continue };
        if offset < ANIM_DATA_START {
            ctx.recover(
                DecodeError::field("sequence-offset-inside-header")
                    .with_arg("sequence", index)
                    .with_arg("offset", offset),
            );
            continue;
        }
        match decode_sequence(buf, index, offset, ctx) {
            Ok(seq) => {
                table.sequences[index] = seq;
                decoded.push(index);
            }
            Err(err) => ctx.recover(err.with_arg("sequence", index)),
        }
    }
    ctx.report_mut().sequences += decoded.len();

    ctx.report_mut().embedded_atlas = find_embedded_atlas(buf, header.image_span());
    apply_names(buf, header.names_start(), table, &decoded, ctx);
    Ok(())
}

fn find_embedded_atlas(buf: &[u8], span: Range<usize>) -> Option<Range<usize>> {
    let end = span.end.min(buf.len());
    let region = buf.get(span.start..end)?;
    let found = region
        .windows(EMBEDDED_ATLAS_MAGIC.len())
        .position(|w| w == EMBEDDED_ATLAS_MAGIC)
        .map(|pos| span.start + pos..end);
    match &found {
        Some(range) => log::debug!("embedded sprite container at {:#x}..{:#x}", range.start, range.end),
        None if span.start < end => log::debug!("image span present but no sprite container magic"),
        None => {}
    }
    found
}

fn apply_names(
    buf: &[u8],
    names_start: usize,
    table: &mut MoveList,
    decoded: &[usize],
    ctx: &DecodeContext,
) {
    let available =
        (buf.len().saturating_sub(names_start) / NAME_RECORD_SIZE).min(OFFSET_TABLE_ENTRIES);
    log::debug!("name table holds {} records", available);

    for &index in decoded {
        let mut name = if index < available {
            let start = names_start + index * NAME_RECORD_SIZE;
            decode_name_record(&buf[start..start + NAME_RECORD_SIZE])
        } else {
            String::new()
        };
        if name.is_empty() && ctx.opts.apply_default_names {
            name = default_name(index).unwrap_or_default().to_string();
        }
        if let Some(seq) = table.get_mut(index) {
            seq.name = name;
        }
    }
}

/// Section offsets outside the sequence are dropped rather than trusted
fn section_offset(
    raw: i32,
    kind: SectionKind,
    seq_len: usize,
    index: usize,
    ctx: &mut DecodeContext,
) -> Option<usize> {
    if raw <= 0 {
        return None;
    }
    let offset = raw as usize;
    if offset < SEQUENCE_HEADER_SIZE || offset >= seq_len {
        ctx.recover(
            DecodeError::field("section-offset-out-of-range")
                .with_arg("sequence", index)
                .with_arg("section", kind.name())
                .with_arg("offset", offset)
                .with_arg("sequence_size", seq_len),
        );
        return None;
    }
    Some(offset)
}

fn decode_sequence(
    buf: &[u8],
    index: usize,
    start: usize,
    ctx: &mut DecodeContext,
) -> Result<Sequence, DecodeError> {
    let header = start
        .checked_add(SEQUENCE_HEADER_SIZE)
        .and_then(|end| buf.get(start..end))
        .ok_or_else(|| DecodeError::field("sequence-header-outside-buffer").with_arg("offset", start))?;

    let mut rdr = Cursor::new(header);
    let frame_data = rdr.read_i32::<LittleEndian>()?;
    let mut raw_sections = [0i32; 4];
    for raw in raw_sections.iter_mut() {
        *raw = rdr.read_i32::<LittleEndian>()?;
    }
    let frame_count = rdr.read_u32::<LittleEndian>()? as usize;
    let declared_size = rdr.read_u32::<LittleEndian>()? as usize;

    let mut seq = Sequence::default();
    seq.status = rdr.read_i32::<LittleEndian>()?;
    seq.level = rdr.read_i32::<LittleEndian>()?;
    seq.flags = rdr.read_i32::<LittleEndian>()?;
    for _ in 0..7 {
        seq.extra_data.push(rdr.read_i32::<LittleEndian>()?);
    }

    if declared_size < SEQUENCE_HEADER_SIZE {
        return Err(DecodeError::field("sequence-size-too-small").with_arg("size", declared_size));
    }
    let available = buf.len() - start;
    let seq_len = if declared_size > available {
        ctx.recover(
            DecodeError::field("sequence-overruns-buffer")
                .with_arg("sequence", index)
                .with_arg("size", declared_size)
                .with_arg("available", available),
        );
        available
    } else {
        declared_size
    };
    let seq_buf = &buf[start..start + seq_len];

    if frame_count > MAX_FRAMES {
        return Err(DecodeError::field("frame-count-too-large").with_arg("count", frame_count));
    }

    let csel = frame_data <= 0;
    let kinds = [
        SectionKind::Hitboxes,
        SectionKind::Effects,
        SectionKind::Conditions,
        SectionKind::Vectors,
    ];
    let mut declared = [Some(SEQUENCE_HEADER_SIZE), None, None, None, None];
    for (slot, (raw, kind)) in raw_sections.iter().zip(kinds).enumerate() {
        declared[slot + 1] = section_offset(*raw, kind, seq_len, index, ctx);
    }
    let layout = SectionLayout::compute(declared, seq_len);

    let fit = layout.capacity(SectionKind::Frames, FRAME_RECORD_SIZE);
    let count = if frame_count > fit {
        ctx.recover(
            DecodeError::field("frames-exceed-section")
                .with_arg("sequence", index)
                .with_arg("declared", frame_count)
                .with_arg("fit", fit),
        );
        fit
    } else {
        frame_count
    };

    seq.allocate(count);
    let reader = FrameReader {
        seq_buf,
        layout: &layout,
        csel,
        sequence: index,
    };
    for (frame_index, frame) in seq.frames.iter_mut().enumerate() {
        reader.read(frame_index, frame, ctx)?;
    }
    ctx.report_mut().frames += count;
    log::debug!(
        "packed sequence {}: {} frames{}",
        index,
        count,
        if csel { " (CSEL)" } else { "" }
    );
    Ok(seq)
}

struct FrameReader<'b> {
    seq_buf: &'b [u8],
    layout: &'b SectionLayout,
    csel: bool,
    sequence: usize,
}

impl FrameReader<'_> {
    fn record(&self, kind: SectionKind, index: i32, size: usize) -> Result<&[u8], DecodeError> {
        let range = self.layout.record(kind, index as usize, size)?;
        Ok(&self.seq_buf[range])
    }

    fn recover(&self, ctx: &mut DecodeContext, err: DecodeError, frame_index: usize) {
        ctx.recover(err.with_arg("sequence", self.sequence).with_arg("frame", frame_index));
    }

    fn read(
        &self,
        frame_index: usize,
        frame: &mut Frame,
        ctx: &mut DecodeContext,
    ) -> Result<(), DecodeError> {
        let range = self.layout.record(SectionKind::Frames, frame_index, FRAME_RECORD_SIZE)?;
        let mut rdr = Cursor::new(&self.seq_buf[range]);

        // display / flow control
        let display = &mut frame.display;
        display.sprite = decode_sprite(rdr.read_i32::<LittleEndian>()?, self.csel);
        display.offset = [rdr.read_i32::<LittleEndian>()?, rdr.read_i32::<LittleEndian>()?];
        display.duration = rdr.read_i32::<LittleEndian>()?;
        let flow = rdr.read_u32::<LittleEndian>()?;
        display.jump_frame = rdr.read_i32::<LittleEndian>()?;
        (display.flow, display.landing_frame) = map_flow(flow, display.jump_frame);
        display.loop_count = rdr.read_i32::<LittleEndian>()?;
        display.loop_end = rdr.read_i32::<LittleEndian>()?;
        display.blend = BlendMode::from_i32(rdr.read_u16::<LittleEndian>()? as i32);
        display.rotation = [0.0, 0.0, rdr.read_i16::<LittleEndian>()? as f32];
        let scale_x = rdr.read_i16::<LittleEndian>()?;
        let scale_y = rdr.read_i16::<LittleEndian>()?;
        display.scale = [scale_x as f32 / 100.0, scale_y as f32 / 100.0];
        display.color = rdr.read_u32::<LittleEndian>()?.to_le_bytes();

        // state
        let state = &mut frame.state;
        state.velocity = [rdr.read_i32::<LittleEndian>()?, rdr.read_i32::<LittleEndian>()?];
        state.acceleration = [rdr.read_i32::<LittleEndian>()?, rdr.read_i32::<LittleEndian>()?];
        state.movement_flags = rdr.read_u32::<LittleEndian>()?;
        state.stance = Stance::from_i32(rdr.read_i32::<LittleEndian>()?);
        state.cancel_normal = rdr.read_i32::<LittleEndian>()?;
        state.cancel_special = rdr.read_i32::<LittleEndian>()?;
        state.invincibility = rdr.read_i32::<LittleEndian>()?;
        for v in state.sine.iter_mut() {
            *v = rdr.read_i32::<LittleEndian>()?;
        }
        state.flags = rdr.read_u32::<LittleEndian>()?;

        // indices
        let hitbox_start = rdr.read_i32::<LittleEndian>()?;
        let hitbox_count = rdr.read_i32::<LittleEndian>()?;
        let mut effects = [0i32; EFFECT_INDEX_COUNT];
        for v in effects.iter_mut() {
            *v = rdr.read_i32::<LittleEndian>()?;
        }
        let mut conditions = [0i32; CONDITION_INDEX_COUNT];
        for v in conditions.iter_mut() {
            *v = rdr.read_i32::<LittleEndian>()?;
        }
        let mut vectors = [0i32; VECTOR_INDEX_COUNT];
        for v in vectors.iter_mut() {
            *v = rdr.read_i32::<LittleEndian>()?;
        }

        self.read_hitboxes(hitbox_start, hitbox_count, frame_index, frame, ctx);

        for &index in effects.iter().filter(|&&i| i >= 0) {
            match self
                .record(SectionKind::Effects, index, LEAF_RECORD_SIZE)
                .and_then(read_effect_record)
            {
                Ok(effect) => frame.effects.push(effect),
                Err(err) => self.recover(ctx, err, frame_index),
            }
        }
        for &index in conditions.iter().filter(|&&i| i >= 0) {
            match self
                .record(SectionKind::Conditions, index, LEAF_RECORD_SIZE)
                .and_then(read_condition_record)
            {
                Ok(condition) => frame.conditions.push(condition),
                Err(err) => self.recover(ctx, err, frame_index),
            }
        }

        if vectors[0] >= 0 {
            match self
                .record(SectionKind::Vectors, vectors[0], VECTOR_RECORD_SIZE)
                .and_then(read_vector_record)
            {
                Ok(attack) => frame.attack = attack,
                Err(err) => self.recover(ctx, err, frame_index),
            }
        }
        frame.reserved_vectors = vectors[1..].to_vec();
        Ok(())
    }

    fn read_hitboxes(
        &self,
        start: i32,
        count: i32,
        frame_index: usize,
        frame: &mut Frame,
        ctx: &mut DecodeContext,
    ) {
        if start < 0 || count <= 0 {
            return;
        }
        if count > HITBOX_SLOT_COUNT as i32 {
            self.recover(
                ctx,
                DecodeError::field("hitbox-count-too-large").with_arg("count", count),
                frame_index,
            );
            return;
        }
        for index in start..start.saturating_add(count) {
            let parsed = self
                .record(SectionKind::Hitboxes, index, HITBOX_RECORD_SIZE)
                .and_then(read_hitbox_record);
            let (kind, rect) = match parsed {
                Ok(v) => v,
                Err(err) => {
                    self.recover(ctx, err, frame_index);
                    continue;
                }
            };
            match frame.free_slot(kind) {
                Some(slot) => {
                    frame.hitboxes.insert(slot, rect);
                }
                None => self.recover(
                    ctx,
                    DecodeError::field("hitbox-slots-exhausted").with_arg("index", index),
                    frame_index,
                ),
            }
        }
    }
}

fn read_hitbox_record(bytes: &[u8]) -> Result<(HitboxKind, Hitbox), DecodeError> {
    let mut rdr = Cursor::new(bytes);
    let kind = rdr.read_i32::<LittleEndian>()?;
    let mut rect = [0i32; 4];
    for v in rect.iter_mut() {
        *v = rdr.read_i32::<LittleEndian>()?;
    }
    let kind = if kind >= ATTACK_KIND_MIN {
        HitboxKind::Attack
    } else {
        HitboxKind::Hurt
    };
    Ok((kind, Hitbox::from_array(rect)))
}

fn read_vector_record(bytes: &[u8]) -> Result<Attack, DecodeError> {
    let mut rdr = Cursor::new(bytes);
    let guard_flags = rdr.read_u32::<LittleEndian>()?;
    let damage = rdr.read_i32::<LittleEndian>()?;
    let red_damage = rdr.read_i32::<LittleEndian>()?;
    let hitstop = rdr.read_i32::<LittleEndian>()?;
    let correction = rdr.read_i32::<LittleEndian>()?;
    let hit_vector = rdr.read_i32::<LittleEndian>()?;
    let guard_vector = rdr.read_i32::<LittleEndian>()?;
    let flags = rdr.read_u32::<LittleEndian>()?;
    Ok(Attack {
        guard_flags,
        damage,
        red_damage,
        hitstop,
        correction,
        hit_vectors: [hit_vector; 3],
        guard_vectors: [guard_vector; 3],
        flags,
        ..Attack::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csel_sprite_numbering() {
        assert_eq!(decode_sprite(10042, true), SpriteRef::Sprite(42));
        assert_eq!(decode_sprite(10042, false), SpriteRef::Pattern(42));
        assert_eq!(decode_sprite(42, false), SpriteRef::Sprite(42));
        assert_eq!(decode_sprite(42, true), SpriteRef::Sprite(42));
        assert_eq!(decode_sprite(-1, false), SpriteRef::None);
    }

    #[test]
    fn flow_mapping() {
        assert_eq!(map_flow(0, 3), (FlowType::EndToPattern, -1));
        assert_eq!(map_flow(2, 3), (FlowType::JumpToFrame, -1));
        assert_eq!(map_flow(3, 6), (FlowType::Next, 6));
        assert_eq!(map_flow(4, 6), (FlowType::JumpToFrame, 6));
        assert_eq!(map_flow(5, 6), (FlowType::Next, -1));
        assert_eq!(map_flow(99, 6), (FlowType::Next, -1));
    }

    #[test]
    fn header_checks_are_fatal() {
        let err = PackedHeader::read(&[0u8; 16]).unwrap_err();
        assert!(err.is_fatal());
        let err = PackedHeader::read(&vec![0u8; ANIM_DATA_START]).unwrap_err();
        assert_eq!(err.key, "bad-packed-magic");
        assert!(err.is_fatal());
    }

    #[test]
    fn mismatched_sizes_use_the_smaller() {
        let mut buf = vec![0u8; ANIM_DATA_START];
        buf[..8].copy_from_slice(PACKED_MAGIC);
        buf[0x0C..0x10].copy_from_slice(&500u32.to_le_bytes());
        buf[0x14..0x18].copy_from_slice(&300u32.to_le_bytes());
        buf[0x18..0x1C].copy_from_slice(&64u32.to_le_bytes());
        let header = PackedHeader::read(&buf).unwrap();
        assert_eq!(header.anim_size, 300);
        assert_eq!(header.image_span(), ANIM_DATA_START + 300..ANIM_DATA_START + 364);
    }

    #[test]
    fn vector_record_fills_attack() {
        let mut bytes = Vec::new();
        for v in [0x5i32, 800, 100, 12, 90, 7, 3, 1] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let attack = read_vector_record(&bytes).unwrap();
        assert_eq!(attack.guard_flags, 5);
        assert_eq!(attack.damage, 800);
        assert_eq!(attack.hit_vectors, [7; 3]);
        assert_eq!(attack.guard_vectors, [3; 3]);
        assert_eq!(attack.untech, 0);
    }
}
