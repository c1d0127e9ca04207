mod context;
mod cursor;
mod detect;
mod frame;
mod layout;
mod load;
mod names;
mod packed;
mod records;
mod sequence;
mod strings;
mod tagged;

pub use context::{DecodeContext, DecodeOptions, DecodeReport};
pub use cursor::{Handled, Tag, TagCursor, is_length_prefixed};
pub use detect::{
    Format, NATIVE_HEADER_SIZE, NATIVE_MAGIC, PACKED_MAGIC, STRING_TABLE_TAG, detect,
    locate_string_table,
};
pub use layout::{Section, SectionKind, SectionLayout};
pub use load::{decode, decode_with_report, load_file};
pub use names::default_name;
pub use packed::{
    ANIM_DATA_START, ATTACK_KIND_MIN, EMBEDDED_ATLAS_MAGIC, FRAME_RECORD_SIZE, HITBOX_RECORD_SIZE,
    OFFSET_TABLE_ENTRIES, PACKED_HEADER_SIZE, PATTERN_REFERENCE_BASE, SEQUENCE_HEADER_SIZE,
    VECTOR_RECORD_SIZE, decode_sprite, map_flow,
};
pub use records::LEAF_RECORD_SIZE;
pub use sequence::{Dialect, MAX_FRAMES, PendingAlias, SequenceAssembler, resolve_aliases};
pub use strings::{NAME_RECORD_SIZE, decode_legacy_text, decode_name_record, encode_legacy_text};
