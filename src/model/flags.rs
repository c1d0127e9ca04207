use serde::{Deserialize, Serialize};

/// Guard flags of an attack block. The raw bitfield is kept on `Attack`;
/// this is a decoded view of the bits we know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardFlag {
    StandBlockable = 0x1,
    AirBlockable = 0x2,
    CrouchBlockable = 0x4,
    Unblockable = 0x10,
    MissStanding = 0x100,
    MissAirborne = 0x200,
    MissCrouching = 0x400,
}

const ALL_GUARD_FLAGS: [GuardFlag; 7] = [
    GuardFlag::StandBlockable,
    GuardFlag::AirBlockable,
    GuardFlag::CrouchBlockable,
    GuardFlag::Unblockable,
    GuardFlag::MissStanding,
    GuardFlag::MissAirborne,
    GuardFlag::MissCrouching,
];

impl GuardFlag {
    /// Get all flags present in the bitfield
    pub fn from_bits(bits: u32) -> Vec<Self> {
        ALL_GUARD_FLAGS
            .iter()
            .copied()
            .filter(|flag| bits & *flag as u32 != 0)
            .collect()
    }

    /// Convert array of flags back to bitfield
    pub fn to_bits(flags: &[Self]) -> u32 {
        let mut bits = 0u32;
        for flag in flags {
            bits |= *flag as u32;
        }
        bits
    }

    /// Bits not covered by any known flag
    pub fn unknown_bits(bits: u32) -> u32 {
        bits & !Self::to_bits(&ALL_GUARD_FLAGS)
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::StandBlockable => "StandBlock",
            Self::AirBlockable => "AirBlock",
            Self::CrouchBlockable => "CrouchBlock",
            Self::Unblockable => "Unblockable",
            Self::MissStanding => "MissStand",
            Self::MissAirborne => "MissAir",
            Self::MissCrouching => "MissCrouch",
        }
    }
}
