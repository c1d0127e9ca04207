use serde::{Deserialize, Serialize};

/// Blend mode of a displayed frame
/// Mapping according to the move list display block:
/// 0 = Normal
/// 1 = Additive
/// 2 = Subtractive
/// 3 = Multiply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal, // 0
    Additive,    // 1
    Subtractive, // 2
    Multiply,    // 3
}

impl BlendMode {
    /// Parse BlendMode from the raw value stored in all three encodings
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::Additive,
            2 => Self::Subtractive,
            3 => Self::Multiply,
            _ => {
                log::warn!("Unknown blend mode: {}, defaulting to Normal", value);
                Self::Normal
            }
        }
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::Additive => 1,
            Self::Subtractive => 2,
            Self::Multiply => 3,
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Additive => "Additive",
            Self::Subtractive => "Subtractive",
            Self::Multiply => "Multiply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_value_falls_back_to_normal() {
        assert_eq!(BlendMode::from_i32(2), BlendMode::Subtractive);
        assert_eq!(BlendMode::from_i32(77), BlendMode::Normal);
        assert_eq!(BlendMode::Multiply.to_i32(), 3);
    }
}
