#![allow(dead_code)]

use movelist::parser::{
    ANIM_DATA_START, FRAME_RECORD_SIZE, NAME_RECORD_SIZE, NATIVE_HEADER_SIZE, NATIVE_MAGIC,
    OFFSET_TABLE_ENTRIES, PACKED_MAGIC, SEQUENCE_HEADER_SIZE, encode_legacy_text,
};

/// Hand-assembled tag stream
#[derive(Default)]
pub struct TagStream {
    pub bytes: Vec<u8>,
}

impl TagStream {
    pub fn native() -> Self {
        let mut bytes = vec![0u8; NATIVE_HEADER_SIZE];
        bytes[..NATIVE_MAGIC.len()].copy_from_slice(NATIVE_MAGIC);
        bytes[0x10] = 1;
        Self { bytes }
    }

    /// Legacy stream with `header` junk bytes in front of the string table
    pub fn legacy(header: usize) -> Self {
        Self {
            bytes: vec![0xCC; header],
        }
    }

    pub fn tag(&mut self, tag: &[u8; 4]) -> &mut Self {
        self.bytes.extend_from_slice(tag);
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32s(&mut self, values: &[i32]) -> &mut Self {
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn blob(&mut self, bytes: &[u8]) -> &mut Self {
        self.u32(bytes.len() as u32).raw(bytes);
        let pad = (4 - bytes.len() % 4) % 4;
        self.raw(&[0u8; 3][..pad])
    }

    pub fn text(&mut self, tag: &[u8; 4], text: &str) -> &mut Self {
        self.tag(tag).blob(&encode_legacy_text(text))
    }

    pub fn hitbox(&mut self, slot: u32, rect: [i32; 4]) -> &mut Self {
        self.tag(b"HRNM").u32(slot).i32s(&rect)
    }

    pub fn alias(&mut self, slot: u32, source_frame: u32, source_slot: u32) -> &mut Self {
        self.tag(b"HRAT").u32(slot).u32(source_frame).u32(source_slot)
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// 52-byte legacy effect record
pub fn effect_record(kind: u16, number: u16, params: [i32; 12]) -> Vec<u8> {
    let mut out = Vec::with_capacity(52);
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&number.to_le_bytes());
    for p in params {
        out.extend_from_slice(&p.to_le_bytes());
    }
    out
}

/// 52-byte legacy condition record
pub fn condition_record(kind: u16, params: [i32; 12]) -> Vec<u8> {
    effect_record(kind, 0, params)
}

/// One 216-byte packed frame record, only the fields tests care about
#[derive(Clone)]
pub struct PackedFrame {
    pub sprite: i32,
    pub offset: [i32; 2],
    pub duration: i32,
    pub flow: u32,
    pub jump: i32,
    pub blend: u16,
    pub rotation: i16,
    pub scale: [i16; 2],
    pub color: u32,
    pub velocity: [i32; 2],
    pub stance: i32,
    pub hitbox_start: i32,
    pub hitbox_count: i32,
    pub effects: [i32; 8],
    pub conditions: [i32; 8],
    pub vectors: [i32; 11],
}

impl Default for PackedFrame {
    fn default() -> Self {
        Self {
            sprite: -1,
            offset: [0, 0],
            duration: 1,
            flow: 0,
            jump: 0,
            blend: 0,
            rotation: 0,
            scale: [100, 100],
            color: u32::MAX,
            velocity: [0, 0],
            stance: 0,
            hitbox_start: -1,
            hitbox_count: 0,
            effects: [-1; 8],
            conditions: [-1; 8],
            vectors: [-1; 11],
        }
    }
}

impl PackedFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut s = TagStream::default();
        s.i32s(&[self.sprite, self.offset[0], self.offset[1], self.duration])
            .u32(self.flow)
            .i32s(&[self.jump, 0, 0]);
        s.raw(&self.blend.to_le_bytes())
            .raw(&self.rotation.to_le_bytes())
            .raw(&self.scale[0].to_le_bytes())
            .raw(&self.scale[1].to_le_bytes())
            .u32(self.color);
        // state: velocity, acceleration, movement flags, stance, cancels,
        // invincibility, sine x4, flags
        s.i32s(&self.velocity)
            .i32s(&[0, 0, 0, self.stance, 0, 0, 0, 0, 0, 0, 0, 0]);
        s.i32s(&[self.hitbox_start, self.hitbox_count])
            .i32s(&self.effects)
            .i32s(&self.conditions)
            .i32s(&self.vectors);
        assert_eq!(s.bytes.len(), FRAME_RECORD_SIZE);
        s.bytes
    }
}

/// Packed sequence laid out header, frames, hitboxes, effects, conditions,
/// vectors; empty sections are declared absent
#[derive(Default, Clone)]
pub struct PackedSequence {
    pub csel: bool,
    pub status: i32,
    pub level: i32,
    pub flags: i32,
    /// Overrides the frame count written into the header
    pub declared_frames: Option<u32>,
    pub frames: Vec<PackedFrame>,
    pub hitboxes: Vec<(i32, [i32; 4])>,
    pub effects: Vec<Vec<u8>>,
    pub conditions: Vec<Vec<u8>>,
    pub vectors: Vec<[i32; 8]>,
}

impl PackedSequence {
    pub fn encode(&self) -> Vec<u8> {
        let mut body = TagStream::default();
        for frame in &self.frames {
            body.raw(&frame.encode());
        }
        let mut offsets = [0i32; 4];
        let mut at = |body: &TagStream, slot: usize, present: bool| {
            if present {
                offsets[slot] = (SEQUENCE_HEADER_SIZE + body.bytes.len()) as i32;
            }
        };
        at(&body, 0, !self.hitboxes.is_empty());
        for (kind, rect) in &self.hitboxes {
            body.i32s(&[*kind]).i32s(rect);
        }
        at(&body, 1, !self.effects.is_empty());
        for record in &self.effects {
            body.raw(record);
        }
        at(&body, 2, !self.conditions.is_empty());
        for record in &self.conditions {
            body.raw(record);
        }
        at(&body, 3, !self.vectors.is_empty());
        for record in &self.vectors {
            body.i32s(record);
        }

        let frame_data = if self.csel { -1 } else { SEQUENCE_HEADER_SIZE as i32 };
        let frame_count = self.declared_frames.unwrap_or(self.frames.len() as u32);
        let mut out = TagStream::default();
        out.i32s(&[frame_data])
            .i32s(&offsets)
            .u32(frame_count)
            .u32((SEQUENCE_HEADER_SIZE + body.bytes.len()) as u32)
            .i32s(&[self.status, self.level, self.flags])
            .i32s(&[0; 7]);
        assert_eq!(out.bytes.len(), SEQUENCE_HEADER_SIZE);
        out.raw(&body.bytes);
        out.bytes
    }
}

#[derive(Default)]
pub struct PackedFile {
    pub sequences: Vec<(usize, PackedSequence)>,
    pub image: Vec<u8>,
    /// `None` writes an all-zero record
    pub names: Vec<Option<String>>,
}

impl PackedFile {
    pub fn build(&self) -> Vec<u8> {
        let mut offsets = vec![-1i32; OFFSET_TABLE_ENTRIES];
        let mut anim = Vec::new();
        for (slot, seq) in &self.sequences {
            offsets[*slot] = (ANIM_DATA_START + anim.len()) as i32;
            anim.extend_from_slice(&seq.encode());
        }

        let mut out = TagStream::default();
        out.raw(PACKED_MAGIC)
            .u32(1)
            .u32(anim.len() as u32)
            .u32(0)
            .u32(anim.len() as u32)
            .u32(self.image.len() as u32);
        out.bytes.resize(0x40, 0);
        out.i32s(&offsets);
        out.raw(&anim).raw(&self.image);
        for name in &self.names {
            let mut record = vec![0u8; NAME_RECORD_SIZE];
            if let Some(name) = name {
                let encoded = encode_legacy_text(name);
                record[..encoded.len()].copy_from_slice(&encoded);
            }
            out.raw(&record);
        }
        out.bytes
    }
}

/// Representative native file: names, every block, hitboxes and an alias
pub fn sample_native() -> Vec<u8> {
    let mut s = TagStream::native();
    s.tag(b"_STR").u32(4);
    for index in [0u32, 3] {
        s.tag(b"PSTR").u32(index).text(b"PNM2", "立ち").tag(b"PSTS").i32s(&[1]);
        s.tag(b"PFCN").u32(2);
        s.tag(b"FSTR").u32(0);
        s.tag(b"AFST")
            .tag(b"AFGP")
            .i32s(&[0, 5])
            .tag(b"AFRT")
            .raw(&[0u8; 12])
            .tag(b"AFED");
        s.tag(b"ATST").tag(b"ATDM").i32s(&[100, 20]).tag(b"ATED");
        s.tag(b"EFST")
            .u32(0)
            .tag(b"EFTP")
            .i32s(&[1])
            .tag(b"EFPR")
            .i32s(&[0; 12])
            .tag(b"EFED");
        s.hitbox(0, [0, 0, 10, 10]).tag(b"FEND");
        s.tag(b"FSTR").u32(1).alias(0, 0, 0).tag(b"FEND");
        s.tag(b"PEND");
    }
    s.tag(b"_END");
    s.build()
}

/// Representative legacy file with fixed leaf records
pub fn sample_legacy() -> Vec<u8> {
    let mut s = TagStream::legacy(0x20);
    s.tag(b"_STR").u32(2).tag(b"PSTR").u32(1).text(b"PNM2", "walk");
    s.tag(b"PFCN").u32(1).tag(b"FSTR").u32(0);
    s.tag(b"EFST").u32(0).raw(&effect_record(1, 2, [3; 12]));
    s.tag(b"IFST").u32(0).raw(&condition_record(2, [4; 12]));
    s.hitbox(1, [0, 0, 4, 4]);
    s.tag(b"FEND").tag(b"PEND").tag(b"_END");
    s.build()
}

/// Representative packed file with every section and a name table
pub fn sample_packed() -> Vec<u8> {
    let mut vectors = [-1; 11];
    vectors[0] = 0;
    let frame = PackedFrame {
        sprite: 10003,
        hitbox_start: 0,
        hitbox_count: 2,
        effects: [0, -1, -1, -1, -1, -1, -1, -1],
        conditions: [0, -1, -1, -1, -1, -1, -1, -1],
        vectors,
        ..PackedFrame::default()
    };
    let seq = PackedSequence {
        frames: vec![frame.clone(), frame],
        hitboxes: vec![(0, [0, 0, 8, 8]), (100, [4, 4, 20, 20])],
        effects: vec![effect_record(1, 9, [0; 12])],
        conditions: vec![condition_record(3, [1; 12])],
        vectors: vec![[1, 500, 0, 8, 90, 2, 2, 0]],
        ..PackedSequence::default()
    };
    PackedFile {
        sequences: vec![(0, seq.clone()), (200, PackedSequence { csel: true, ..seq })],
        image: b"SPRPACK1\0\0\0\0".to_vec(),
        names: vec![Some("立ち".to_string())],
    }
    .build()
}
