use crate::error::DecodeError;
use crate::model::{MoveList, Sequence};
use crate::parser::context::DecodeContext;
use crate::parser::cursor::{Handled, Tag, TagCursor};
use crate::parser::detect::{Format, locate_string_table};
use crate::parser::sequence::{Dialect, SequenceAssembler};

pub const SEQUENCE_START: Tag = *b"PSTR";
pub const STREAM_END: Tag = *b"_END";

/// Decodes the native or legacy tag stream into `table`. Only a missing or
/// unreadable string-table header is fatal; everything after it is absorbed.
pub fn decode_tagged(
    buf: &[u8],
    dialect: Dialect,
    table: &mut MoveList,
    ctx: &mut DecodeContext,
) -> Result<(), DecodeError> {
    let format = match dialect {
        Dialect::Native => Format::NativeTag,
        Dialect::Legacy => Format::LegacyTag,
    };
    let start = locate_string_table(buf, format)
        .ok_or_else(|| DecodeError::fatal("missing-string-table").with_arg("format", format.name()))?;

    let mut cursor = TagCursor::new(buf, start + 4);
    let count = cursor.read_u32().map_err(DecodeError::escalate)? as usize;
    if count > ctx.opts.table_size {
        return Err(DecodeError::fatal("sequence-count-too-large")
            .with_arg("count", count)
            .with_arg("table_size", ctx.opts.table_size));
    }
    log::info!(
        "{} move list at {:#x}: {} sequences",
        format.name(),
        start,
        count
    );
    table.prepare(count, ctx.opts.merge);

    let result = cursor.run_block(STREAM_END, ctx, |tag, c, ctx| {
        if tag != SEQUENCE_START {
            return Ok(Handled::Unknown);
        }
        let index = c.read_u32()? as usize;
        let mut seq = Sequence::default();
        let decoded = SequenceAssembler::new(dialect, index).decode(c, &mut seq, ctx);
        match table.get_mut(index) {
            Some(slot) => {
                *slot = seq;
                ctx.report_mut().sequences += 1;
            }
            None => ctx.recover(
                DecodeError::field("sequence-index-out-of-range")
                    .with_arg("sequence", index)
                    .with_arg("table", count),
            ),
        }
        decoded.map(|_| Handled::Yes)
    });

    if let Err(err) = result {
        ctx.recover(err);
    }
    Ok(())
}
