use crate::error::DecodeError;
use crate::model::{
    Attack, BlendMode, Condition, Display, Effect, FlowType, Frame, HITBOX_SLOT_COUNT, Hitbox,
    SpriteRef, Stance, State,
};
use crate::parser::context::DecodeContext;
use crate::parser::cursor::{Handled, Tag, TagCursor};
use crate::parser::records::{LEAF_RECORD_SIZE, read_condition_record, read_effect_record};
use crate::parser::sequence::{Dialect, PendingAlias};

pub const FRAME_END: Tag = *b"FEND";
pub const DISPLAY_START: Tag = *b"AFST";
pub const DISPLAY_END: Tag = *b"AFED";
pub const STATE_START: Tag = *b"ASST";
pub const STATE_END: Tag = *b"ASED";
pub const ATTACK_START: Tag = *b"ATST";
pub const ATTACK_END: Tag = *b"ATED";
pub const EFFECT_START: Tag = *b"EFST";
pub const EFFECT_END: Tag = *b"EFED";
pub const CONDITION_START: Tag = *b"IFST";
pub const CONDITION_END: Tag = *b"IFED";
pub const HITBOX_DIRECT: Tag = *b"HRNM";
pub const HITBOX_ALIAS: Tag = *b"HRAT";

/// Highest effect/condition index a frame may carry
pub const MAX_LEAF_ENTRIES: usize = 32;

fn hitbox_slot(raw: u32) -> Result<u8, DecodeError> {
    if raw >= HITBOX_SLOT_COUNT as u32 {
        return Err(DecodeError::field("hitbox-slot-out-of-range").with_arg("slot", raw));
    }
    Ok(raw as u8)
}

/// Stores `item` at `index`, padding with defaults; order is meaningful
fn place<T: Default>(
    list: &mut Vec<T>,
    index: usize,
    item: T,
    what: &'static str,
    frame_index: usize,
    ctx: &mut DecodeContext,
) {
    if index >= MAX_LEAF_ENTRIES {
        ctx.recover(
            DecodeError::field("leaf-index-out-of-range")
                .with_arg("what", what)
                .with_arg("frame", frame_index)
                .with_arg("index", index),
        );
        return;
    }
    if index >= list.len() {
        list.resize_with(index + 1, T::default);
    }
    list[index] = item;
}

/// Decodes one frame body up to `FEND`. Aliases found here are queued, not
/// resolved: their source may not be decoded yet.
pub(crate) fn decode_frame(
    cursor: &mut TagCursor<'_>,
    dialect: Dialect,
    frame_index: usize,
    frame_count: usize,
    frame: &mut Frame,
    aliases: &mut Vec<PendingAlias>,
    ctx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    cursor.run_block(FRAME_END, ctx, |tag, c, ctx| {
        match tag {
            DISPLAY_START => {
                c.run_block(DISPLAY_END, ctx, |t, c, _| display_tag(t, c, &mut frame.display))?
            }
            STATE_START => c.run_block(STATE_END, ctx, |t, c, _| state_tag(t, c, &mut frame.state))?,
            ATTACK_START => {
                c.run_block(ATTACK_END, ctx, |t, c, _| attack_tag(t, c, &mut frame.attack))?
            }
            EFFECT_START => {
                let index = c.read_u32()? as usize;
                let effect = match dialect {
                    Dialect::Legacy => read_effect_record(c.read_bytes(LEAF_RECORD_SIZE)?)?,
                    Dialect::Native => {
                        let mut effect = Effect::default();
                        c.run_block(EFFECT_END, ctx, |t, c, _| effect_tag(t, c, &mut effect))?;
                        effect
                    }
                };
                place(&mut frame.effects, index, effect, "effect", frame_index, ctx);
            }
            CONDITION_START => {
                let index = c.read_u32()? as usize;
                let condition = match dialect {
                    Dialect::Legacy => read_condition_record(c.read_bytes(LEAF_RECORD_SIZE)?)?,
                    Dialect::Native => {
                        let mut condition = Condition::default();
                        c.run_block(CONDITION_END, ctx, |t, c, _| {
                            condition_tag(t, c, &mut condition)
                        })?;
                        condition
                    }
                };
                place(&mut frame.conditions, index, condition, "condition", frame_index, ctx);
            }
            HITBOX_DIRECT => {
                let raw_slot = c.read_u32()?;
                let rect = Hitbox::from_array(c.read_i32s::<4>()?);
                match hitbox_slot(raw_slot) {
                    Ok(slot) => {
                        frame.hitboxes.insert(slot, rect);
                    }
                    Err(err) => ctx.recover(err.with_arg("frame", frame_index)),
                }
            }
            HITBOX_ALIAS => {
                let raw_slot = c.read_u32()?;
                let source_frame = c.read_u32()? as usize;
                let raw_source_slot = c.read_u32()?;
                let checked = hitbox_slot(raw_slot).and_then(|slot| {
                    if source_frame >= frame_count {
                        return Err(DecodeError::field("alias-frame-out-of-range")
                            .with_arg("source_frame", source_frame));
                    }
                    Ok((slot, hitbox_slot(raw_source_slot)?))
                });
                match checked {
                    Ok((target_slot, source_slot)) => aliases.push(PendingAlias {
                        target_frame: frame_index,
                        target_slot,
                        source_frame,
                        source_slot,
                    }),
                    Err(err) => ctx.recover(err.with_arg("frame", frame_index)),
                }
            }
            _ => return Ok(Handled::Unknown),
        }
        Ok(Handled::Yes)
    })
}

fn display_tag(tag: Tag, c: &mut TagCursor<'_>, display: &mut Display) -> Result<Handled, DecodeError> {
    match &tag {
        b"AFGP" => {
            let [use_pattern, id] = c.read_i32s::<2>()?;
            display.sprite = match (use_pattern, id) {
                (_, id) if id < 0 => SpriteRef::None,
                (0, id) => SpriteRef::Sprite(id),
                (_, id) => SpriteRef::Pattern(id),
            };
        }
        b"AFOF" => display.offset = c.read_i32s::<2>()?,
        b"AFDT" => display.duration = c.read_i32()?,
        b"AFJP" => {
            let [flow, jump] = c.read_i32s::<2>()?;
            display.flow = FlowType::from_i32(flow);
            display.jump_frame = jump;
        }
        b"AFLC" => display.landing_frame = c.read_i32()?,
        b"AFLP" => {
            let [count, end] = c.read_i32s::<2>()?;
            display.loop_count = count;
            display.loop_end = end;
        }
        b"AFRT" => display.rotation = c.read_f32s::<3>()?,
        b"AFZM" => display.scale = c.read_f32s::<2>()?,
        b"AFCL" => {
            let rgba = c.read_bytes(4)?;
            display.color = [rgba[0], rgba[1], rgba[2], rgba[3]];
        }
        b"AFBM" => display.blend = BlendMode::from_i32(c.read_i32()?),
        b"AFPR" => display.priority = c.read_i32()?,
        b"AFFL" => display.flags = c.read_u32()?,
        _ => return Ok(Handled::Unknown),
    }
    Ok(Handled::Yes)
}

fn state_tag(tag: Tag, c: &mut TagCursor<'_>, state: &mut State) -> Result<Handled, DecodeError> {
    match &tag {
        b"ASVL" => state.velocity = c.read_i32s::<2>()?,
        b"ASAC" => state.acceleration = c.read_i32s::<2>()?,
        b"ASMV" => state.movement_flags = c.read_u32()?,
        b"ASSN" => state.stance = Stance::from_i32(c.read_i32()?),
        b"ASCN" => {
            let [normal, special] = c.read_i32s::<2>()?;
            state.cancel_normal = normal;
            state.cancel_special = special;
        }
        b"ASIV" => state.invincibility = c.read_i32()?,
        b"ASCT" => state.counter_type = c.read_i32()?,
        b"ASSM" => state.sine = c.read_i32s::<4>()?,
        b"ASFL" => state.flags = c.read_u32()?,
        _ => return Ok(Handled::Unknown),
    }
    Ok(Handled::Yes)
}

fn attack_tag(tag: Tag, c: &mut TagCursor<'_>, attack: &mut Attack) -> Result<Handled, DecodeError> {
    match &tag {
        b"ATGD" => attack.guard_flags = c.read_u32()?,
        b"ATDM" => {
            let [damage, red] = c.read_i32s::<2>()?;
            attack.damage = damage;
            attack.red_damage = red;
        }
        b"ATCR" => {
            let [correction, kind] = c.read_i32s::<2>()?;
            attack.correction = correction;
            attack.correction_type = kind;
        }
        b"ATHV" => attack.hit_vectors = c.read_i32s::<3>()?,
        b"ATGV" => attack.guard_vectors = c.read_i32s::<3>()?,
        b"ATHS" => attack.hitstop = c.read_i32()?,
        b"ATUN" => {
            let [untech, blockstun] = c.read_i32s::<2>()?;
            attack.untech = untech;
            attack.blockstun = blockstun;
        }
        b"ATFL" => attack.flags = c.read_u32()?,
        _ => return Ok(Handled::Unknown),
    }
    Ok(Handled::Yes)
}

fn effect_tag(tag: Tag, c: &mut TagCursor<'_>, effect: &mut Effect) -> Result<Handled, DecodeError> {
    match &tag {
        b"EFTP" => effect.kind = c.read_i32()?,
        b"EFNO" => effect.number = c.read_i32()?,
        b"EFPR" => effect.params = c.read_i32s()?,
        _ => return Ok(Handled::Unknown),
    }
    Ok(Handled::Yes)
}

fn condition_tag(
    tag: Tag,
    c: &mut TagCursor<'_>,
    condition: &mut Condition,
) -> Result<Handled, DecodeError> {
    match &tag {
        b"IFTP" => condition.kind = c.read_i32()?,
        b"IFPR" => condition.params = c.read_i32s()?,
        _ => return Ok(Handled::Unknown),
    }
    Ok(Handled::Yes)
}
