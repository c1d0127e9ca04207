use serde::{Deserialize, Serialize};

/// Number of hitbox slots in a frame (ids 0..=32)
pub const HITBOX_SLOT_COUNT: u8 = 33;
/// First attack-box slot; everything below is a hurt box
pub const ATTACK_SLOT_FIRST: u8 = 25;
pub const HURT_SLOT_LAST: u8 = ATTACK_SLOT_FIRST - 1;
pub const ATTACK_SLOT_LAST: u8 = HITBOX_SLOT_COUNT - 1;

/// Rectangle in sprite space. Zero width or height marks "not present"
/// for the save path; the decoders keep such boxes as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hitbox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Hitbox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_array(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }
}

/// Hurt or attack region, derived from the slot id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitboxKind {
    Hurt,
    Attack,
}

impl HitboxKind {
    pub fn of_slot(slot: u8) -> Option<Self> {
        match slot {
            0..=HURT_SLOT_LAST => Some(Self::Hurt),
            ATTACK_SLOT_FIRST..=ATTACK_SLOT_LAST => Some(Self::Attack),
            _ => None,
        }
    }

    pub fn slots(self) -> std::ops::RangeInclusive<u8> {
        match self {
            Self::Hurt => 0..=HURT_SLOT_LAST,
            Self::Attack => ATTACK_SLOT_FIRST..=ATTACK_SLOT_LAST,
        }
    }
}
