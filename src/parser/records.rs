use crate::error::DecodeError;
use crate::model::{CONDITION_PARAM_COUNT, Condition, EFFECT_PARAM_COUNT, Effect};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Positional effect/condition record shared by the legacy tag format and
/// the packed format: u16 type, u16 number, 12 x i32 parameters
pub const LEAF_RECORD_SIZE: usize = 52;

fn check_len(bytes: &[u8], what: &'static str) -> Result<(), DecodeError> {
    if bytes.len() < LEAF_RECORD_SIZE {
        return Err(DecodeError::field("short-record")
            .with_arg("what", what)
            .with_arg("length", bytes.len()));
    }
    Ok(())
}

fn read_params<const N: usize>(rdr: &mut Cursor<&[u8]>) -> Result<[i32; N], DecodeError> {
    let mut params = [0i32; N];
    for p in params.iter_mut() {
        *p = rdr.read_i32::<LittleEndian>()?;
    }
    Ok(params)
}

pub fn read_effect_record(bytes: &[u8]) -> Result<Effect, DecodeError> {
    check_len(bytes, "effect")?;
    let mut rdr = Cursor::new(bytes);
    let kind = rdr.read_u16::<LittleEndian>()?;
    let number = rdr.read_u16::<LittleEndian>()?;
    let params = read_params::<EFFECT_PARAM_COUNT>(&mut rdr)?;
    Ok(Effect::new(kind as i32, number as i32, params))
}

/// The u16 after the type is reserved in condition records and dropped
pub fn read_condition_record(bytes: &[u8]) -> Result<Condition, DecodeError> {
    check_len(bytes, "condition")?;
    let mut rdr = Cursor::new(bytes);
    let kind = rdr.read_u16::<LittleEndian>()?;
    let _reserved = rdr.read_u16::<LittleEndian>()?;
    let params = read_params::<CONDITION_PARAM_COUNT>(&mut rdr)?;
    Ok(Condition::new(kind as i32, params))
}
