use super::{BlendMode, Condition, Effect, GuardFlag, Hitbox, HitboxKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a frame shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpriteRef {
    #[default]
    None,
    /// Index into the character's sprite atlas
    Sprite(i32),
    /// Another pattern composited in place of a sprite
    Pattern(i32),
}

impl SpriteRef {
    pub fn sprite_id(&self) -> Option<i32> {
        match self {
            Self::Sprite(id) => Some(*id),
            _ => None,
        }
    }
}

/// Where playback goes once a frame's duration runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowType {
    /// Return to the pattern named by `jump_frame` (0 = neutral)
    #[default]
    EndToPattern,
    Next,
    JumpToFrame,
}

impl FlowType {
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::EndToPattern,
            1 => Self::Next,
            2 => Self::JumpToFrame,
            _ => {
                log::warn!("Unknown flow type: {}, defaulting to Next", value);
                Self::Next
            }
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::EndToPattern => 0,
            Self::Next => 1,
            Self::JumpToFrame => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub sprite: SpriteRef,
    pub offset: [i32; 2],
    pub duration: i32,
    pub flow: FlowType,
    pub jump_frame: i32,
    /// Frame to jump to on landing; -1 when the frame has no landing branch
    pub landing_frame: i32,
    pub loop_count: i32,
    pub loop_end: i32,
    pub rotation: [f32; 3],
    pub scale: [f32; 2],
    pub color: [u8; 4],
    pub blend: BlendMode,
    pub priority: i32,
    pub flags: u32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            sprite: SpriteRef::None,
            offset: [0, 0],
            duration: 1,
            flow: FlowType::EndToPattern,
            jump_frame: 0,
            landing_frame: -1,
            loop_count: 0,
            loop_end: 0,
            rotation: [0.0; 3],
            scale: [1.0, 1.0],
            color: [255; 4],
            blend: BlendMode::Normal,
            priority: 0,
            flags: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Standing,
    Airborne,
    Crouching,
    Other(i32),
}

impl Stance {
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Standing,
            1 => Self::Airborne,
            2 => Self::Crouching,
            other => Self::Other(other),
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::Standing => 0,
            Self::Airborne => 1,
            Self::Crouching => 2,
            Self::Other(v) => v,
        }
    }
}

/// Physics and state flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct State {
    pub velocity: [i32; 2],
    pub acceleration: [i32; 2],
    pub movement_flags: u32,
    pub stance: Stance,
    pub cancel_normal: i32,
    pub cancel_special: i32,
    pub invincibility: i32,
    pub counter_type: i32,
    /// Sine motion: amplitude x/y, period x/y
    pub sine: [i32; 4],
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attack {
    pub guard_flags: u32,
    pub damage: i32,
    pub red_damage: i32,
    pub correction: i32,
    pub correction_type: i32,
    /// Stand/air/crouch hit vector ids
    pub hit_vectors: [i32; 3],
    pub guard_vectors: [i32; 3],
    pub hitstop: i32,
    pub untech: i32,
    pub blockstun: i32,
    pub flags: u32,
}

impl Attack {
    pub fn guard(&self) -> Vec<GuardFlag> {
        GuardFlag::from_bits(self.guard_flags)
    }
}

/// One timestep of a sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub display: Display,
    pub state: State,
    pub attack: Attack,
    pub effects: Vec<Effect>,
    pub conditions: Vec<Condition>,
    /// Sparse slot id -> rectangle; slots 0..=24 hurt, 25..=32 attack
    pub hitboxes: BTreeMap<u8, Hitbox>,
    /// Packed-format vector indices past the main one, kept unresolved
    pub reserved_vectors: Vec<i32>,
}

impl Frame {
    pub fn hitboxes_of(&self, kind: HitboxKind) -> impl Iterator<Item = (u8, &Hitbox)> {
        self.hitboxes
            .range(kind.slots())
            .map(|(slot, hitbox)| (*slot, hitbox))
    }

    /// First unused slot of the given kind
    pub fn free_slot(&self, kind: HitboxKind) -> Option<u8> {
        kind.slots().find(|slot| !self.hitboxes.contains_key(slot))
    }

    /// Drops zero-area boxes; returns how many were removed
    pub fn prune_degenerate_hitboxes(&mut self) -> usize {
        let before = self.hitboxes.len();
        self.hitboxes.retain(|_, hitbox| !hitbox.is_degenerate());
        before - self.hitboxes.len()
    }
}
