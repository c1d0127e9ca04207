use crate::error::LoadError;
use crate::model::MoveList;
use crate::parser::context::{DecodeContext, DecodeOptions, DecodeReport};
use crate::parser::detect::{Format, detect};
use crate::parser::packed::decode_packed;
use crate::parser::sequence::Dialect;
use crate::parser::tagged::decode_tagged;
use std::path::Path;

/// Decodes any of the three encodings into `table`. Only unrecognized input
/// and fatal header damage fail; everything else is logged and absorbed.
pub fn decode(buf: &[u8], table: &mut MoveList, opts: &DecodeOptions) -> Result<Format, LoadError> {
    decode_with_report(buf, table, opts).map(|report| report.format.unwrap_or(Format::Unrecognized))
}

pub fn decode_with_report(
    buf: &[u8],
    table: &mut MoveList,
    opts: &DecodeOptions,
) -> Result<DecodeReport, LoadError> {
    let format = detect(buf);
    let mut ctx = DecodeContext::new(opts);
    ctx.report_mut().format = Some(format);

    match format {
        Format::NativeTag => decode_tagged(buf, Dialect::Native, table, &mut ctx)?,
        Format::LegacyTag => decode_tagged(buf, Dialect::Legacy, table, &mut ctx)?,
        Format::LegacyPacked => decode_packed(buf, table, &mut ctx)?,
        Format::Unrecognized => return Err(LoadError::Unrecognized),
    }

    let report = ctx.into_report();
    log::info!(
        "decoded {} sequences, {} frames ({} recovered errors, {} unknown tags)",
        report.sequences,
        report.frames,
        report.recovered,
        report.unknown_tags
    );
    Ok(report)
}

pub fn load_file(
    path: impl AsRef<Path>,
    table: &mut MoveList,
    opts: &DecodeOptions,
) -> Result<DecodeReport, LoadError> {
    let path = path.as_ref();
    log::info!("Loading move list: {}", path.display());
    let buf = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_with_report(&buf, table, opts)
}
