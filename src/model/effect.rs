use serde::{Deserialize, Serialize};

pub const EFFECT_PARAM_COUNT: usize = 12;
pub const CONDITION_PARAM_COUNT: usize = 12;
/// Condition parameters past this index have no known meaning
pub const CONDITION_USED_PARAMS: usize = 9;

/// Scripted effect fired when a frame is entered. `kind` selects the meaning
/// of `params`; the raw array is always kept so unknown kinds survive a load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Effect {
    pub kind: i32,
    pub number: i32,
    pub params: [i32; EFFECT_PARAM_COUNT],
}

impl Effect {
    pub fn new(kind: i32, number: i32, params: [i32; EFFECT_PARAM_COUNT]) -> Self {
        Self {
            kind,
            number,
            params,
        }
    }

    pub fn typed(&self) -> EffectKind {
        EffectKind::from_raw(self.kind)
    }

    /// Pattern spawned by spawn-type effects
    pub fn spawned_pattern(&self) -> Option<i32> {
        match self.typed() {
            EffectKind::Spawn | EffectKind::SpawnRelative => Some(self.number),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Spawn,         // 1
    Visual,        // 2
    Audio,         // 3
    Script,        // 4
    SpawnRelative, // 101
    Unknown(i32),
}

impl EffectKind {
    pub fn from_raw(value: i32) -> Self {
        match value {
            1 => Self::Spawn,
            2 => Self::Visual,
            3 => Self::Audio,
            4 => Self::Script,
            101 => Self::SpawnRelative,
            other => Self::Unknown(other),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::Spawn => 1,
            Self::Visual => 2,
            Self::Audio => 3,
            Self::Script => 4,
            Self::SpawnRelative => 101,
            Self::Unknown(v) => v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spawn => "Spawn",
            Self::Visual => "Visual",
            Self::Audio => "Audio",
            Self::Script => "Script",
            Self::SpawnRelative => "SpawnRelative",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// Branch predicate evaluated on a frame. Order within a frame matters:
/// consumers take the first condition that matches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub kind: i32,
    pub params: [i32; CONDITION_PARAM_COUNT],
}

impl Condition {
    pub fn new(kind: i32, params: [i32; CONDITION_PARAM_COUNT]) -> Self {
        Self { kind, params }
    }

    pub fn typed(&self) -> ConditionKind {
        ConditionKind::from_raw(self.kind)
    }

    pub fn used_params(&self) -> &[i32] {
        &self.params[..CONDITION_USED_PARAMS]
    }

    /// Frame jumped to when the condition holds, for the kinds that branch
    pub fn branch_target(&self) -> Option<i32> {
        match self.typed() {
            ConditionKind::Unknown(_) => None,
            _ => Some(self.params[0]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionKind {
    Always,      // 1
    Distance,    // 2
    Input,       // 3
    Landing,     // 4
    HitConfirm,  // 5
    Variable,    // 6
    Unknown(i32),
}

impl ConditionKind {
    pub fn from_raw(value: i32) -> Self {
        match value {
            1 => Self::Always,
            2 => Self::Distance,
            3 => Self::Input,
            4 => Self::Landing,
            5 => Self::HitConfirm,
            6 => Self::Variable,
            other => Self::Unknown(other),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::Always => 1,
            Self::Distance => 2,
            Self::Input => 3,
            Self::Landing => 4,
            Self::HitConfirm => 5,
            Self::Variable => 6,
            Self::Unknown(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_effect_kind_keeps_raw_value() {
        let effect = Effect::new(55, 0, [0; EFFECT_PARAM_COUNT]);
        assert_eq!(effect.typed(), EffectKind::Unknown(55));
        assert_eq!(effect.typed().to_raw(), 55);
        assert_eq!(effect.spawned_pattern(), None);
    }

    #[test]
    fn spawn_effect_exposes_pattern() {
        let effect = Effect::new(101, 340, [0; EFFECT_PARAM_COUNT]);
        assert_eq!(effect.spawned_pattern(), Some(340));
    }

    #[test]
    fn condition_branch_target_only_for_known_kinds() {
        let mut params = [0; CONDITION_PARAM_COUNT];
        params[0] = 7;
        assert_eq!(Condition::new(4, params).branch_target(), Some(7));
        assert_eq!(Condition::new(90, params).branch_target(), None);
        assert_eq!(Condition::new(4, params).used_params().len(), 9);
    }
}
