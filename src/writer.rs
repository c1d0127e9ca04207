use crate::model::{Attack, Display, Frame, MoveList, Sequence, SpriteRef, State};
use crate::parser::{NATIVE_HEADER_SIZE, NATIVE_MAGIC, Tag, encode_legacy_text};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

pub const NATIVE_VERSION: u32 = 1;

/// Tag-stream emitter for the native format
struct TagWriter<W: Write> {
    out: W,
}

impl<W: Write> TagWriter<W> {
    fn tag(&mut self, tag: Tag) -> io::Result<&mut Self> {
        self.out.write_all(&tag)?;
        Ok(self)
    }

    fn i32s(&mut self, values: &[i32]) -> io::Result<&mut Self> {
        for v in values {
            self.out.write_i32::<LittleEndian>(*v)?;
        }
        Ok(self)
    }

    fn u32(&mut self, value: u32) -> io::Result<&mut Self> {
        self.out.write_u32::<LittleEndian>(value)?;
        Ok(self)
    }

    fn f32s(&mut self, values: &[f32]) -> io::Result<&mut Self> {
        for v in values {
            self.out.write_f32::<LittleEndian>(*v)?;
        }
        Ok(self)
    }

    fn blob(&mut self, bytes: &[u8]) -> io::Result<&mut Self> {
        self.u32(bytes.len() as u32)?;
        self.out.write_all(bytes)?;
        let pad = (4 - bytes.len() % 4) % 4;
        self.out.write_all(&[0u8; 3][..pad])?;
        Ok(self)
    }

    fn text(&mut self, tag: Tag, text: &str) -> io::Result<()> {
        self.tag(tag)?.blob(&encode_legacy_text(text))?;
        Ok(())
    }
}

/// Writes `table` in the native encoding. Empty slots are left out but keep
/// their index; degenerate hitboxes are not written.
pub fn write_native<W: Write>(table: &MoveList, out: W) -> io::Result<()> {
    let mut w = TagWriter { out };
    let mut header = [0u8; NATIVE_HEADER_SIZE];
    header[..NATIVE_MAGIC.len()].copy_from_slice(NATIVE_MAGIC);
    header[0x10..0x14].copy_from_slice(&NATIVE_VERSION.to_le_bytes());
    w.out.write_all(&header)?;

    w.tag(*b"_STR")?.u32(table.len() as u32)?;
    for (index, seq) in table.initialized() {
        w.tag(*b"PSTR")?.u32(index as u32)?;
        write_sequence(&mut w, seq)?;
        w.tag(*b"PEND")?;
    }
    w.tag(*b"_END")?;
    w.out.flush()
}

pub fn encode(table: &MoveList) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_native(table, &mut out)?;
    Ok(out)
}

fn write_sequence<W: Write>(w: &mut TagWriter<W>, seq: &Sequence) -> io::Result<()> {
    w.text(*b"PNM2", &seq.name)?;
    w.text(*b"PCN2", &seq.code_name)?;
    w.tag(*b"PSTS")?.i32s(&[seq.status])?;
    w.tag(*b"PLVL")?.i32s(&[seq.level])?;
    w.tag(*b"PFLG")?.i32s(&[seq.flags])?;
    if !seq.extra_data.is_empty() {
        let bytes: Vec<u8> = seq.extra_data.iter().flat_map(|v| v.to_le_bytes()).collect();
        w.tag(*b"PDS2")?.blob(&bytes)?;
    }
    w.tag(*b"PFCN")?.u32(seq.frames.len() as u32)?;
    for (index, frame) in seq.frames.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| &seq.frames[i]);
        w.tag(*b"FSTR")?.u32(index as u32)?;
        write_frame(w, frame, index, previous)?;
        w.tag(*b"FEND")?;
    }
    Ok(())
}

fn write_frame<W: Write>(
    w: &mut TagWriter<W>,
    frame: &Frame,
    index: usize,
    previous: Option<&Frame>,
) -> io::Result<()> {
    if frame.display != Display::default() {
        w.tag(*b"AFST")?;
        write_display(w, &frame.display)?;
        w.tag(*b"AFED")?;
    }
    if frame.state != State::default() {
        w.tag(*b"ASST")?;
        write_state(w, &frame.state)?;
        w.tag(*b"ASED")?;
    }
    if frame.attack != Attack::default() {
        w.tag(*b"ATST")?;
        write_attack(w, &frame.attack)?;
        w.tag(*b"ATED")?;
    }
    for (i, effect) in frame.effects.iter().enumerate() {
        w.tag(*b"EFST")?.u32(i as u32)?;
        w.tag(*b"EFTP")?.i32s(&[effect.kind])?;
        w.tag(*b"EFNO")?.i32s(&[effect.number])?;
        w.tag(*b"EFPR")?.i32s(&effect.params)?;
        w.tag(*b"EFED")?;
    }
    for (i, condition) in frame.conditions.iter().enumerate() {
        w.tag(*b"IFST")?.u32(i as u32)?;
        w.tag(*b"IFTP")?.i32s(&[condition.kind])?;
        w.tag(*b"IFPR")?.i32s(&condition.params)?;
        w.tag(*b"IFED")?;
    }
    for (&slot, rect) in frame.hitboxes.iter().filter(|(_, r)| !r.is_degenerate()) {
        // a box repeated from the previous frame is written as a reference
        let repeated = previous.and_then(|p| p.hitboxes.get(&slot)) == Some(rect);
        if repeated {
            w.tag(*b"HRAT")?
                .u32(slot as u32)?
                .u32(index as u32 - 1)?
                .u32(slot as u32)?;
        } else {
            w.tag(*b"HRNM")?.u32(slot as u32)?.i32s(&rect.to_array())?;
        }
    }
    Ok(())
}

fn write_display<W: Write>(w: &mut TagWriter<W>, d: &Display) -> io::Result<()> {
    match d.sprite {
        SpriteRef::None => {}
        SpriteRef::Sprite(id) => {
            w.tag(*b"AFGP")?.i32s(&[0, id])?;
        }
        SpriteRef::Pattern(id) => {
            w.tag(*b"AFGP")?.i32s(&[1, id])?;
        }
    }
    w.tag(*b"AFOF")?.i32s(&d.offset)?;
    w.tag(*b"AFDT")?.i32s(&[d.duration])?;
    w.tag(*b"AFJP")?.i32s(&[d.flow.to_i32(), d.jump_frame])?;
    w.tag(*b"AFLC")?.i32s(&[d.landing_frame])?;
    w.tag(*b"AFLP")?.i32s(&[d.loop_count, d.loop_end])?;
    w.tag(*b"AFRT")?.f32s(&d.rotation)?;
    w.tag(*b"AFZM")?.f32s(&d.scale)?;
    w.tag(*b"AFCL")?.out.write_all(&d.color)?;
    w.tag(*b"AFBM")?.i32s(&[d.blend.to_i32()])?;
    w.tag(*b"AFPR")?.i32s(&[d.priority])?;
    w.tag(*b"AFFL")?.u32(d.flags)?;
    Ok(())
}

fn write_state<W: Write>(w: &mut TagWriter<W>, s: &State) -> io::Result<()> {
    w.tag(*b"ASVL")?.i32s(&s.velocity)?;
    w.tag(*b"ASAC")?.i32s(&s.acceleration)?;
    w.tag(*b"ASMV")?.u32(s.movement_flags)?;
    w.tag(*b"ASSN")?.i32s(&[s.stance.to_i32()])?;
    w.tag(*b"ASCN")?.i32s(&[s.cancel_normal, s.cancel_special])?;
    w.tag(*b"ASIV")?.i32s(&[s.invincibility])?;
    w.tag(*b"ASCT")?.i32s(&[s.counter_type])?;
    w.tag(*b"ASSM")?.i32s(&s.sine)?;
    w.tag(*b"ASFL")?.u32(s.flags)?;
    Ok(())
}

fn write_attack<W: Write>(w: &mut TagWriter<W>, a: &Attack) -> io::Result<()> {
    w.tag(*b"ATGD")?.u32(a.guard_flags)?;
    w.tag(*b"ATDM")?.i32s(&[a.damage, a.red_damage])?;
    w.tag(*b"ATCR")?.i32s(&[a.correction, a.correction_type])?;
    w.tag(*b"ATHV")?.i32s(&a.hit_vectors)?;
    w.tag(*b"ATGV")?.i32s(&a.guard_vectors)?;
    w.tag(*b"ATHS")?.i32s(&[a.hitstop])?;
    w.tag(*b"ATUN")?.i32s(&[a.untech, a.blockstun])?;
    w.tag(*b"ATFL")?.u32(a.flags)?;
    Ok(())
}
