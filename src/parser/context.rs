use crate::error::{DecodeError, ErrorClass};
use crate::model::{DEFAULT_TABLE_SIZE, MergeMode};
use crate::parser::cursor::{Tag, tag_name};
use crate::parser::detect::Format;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    pub merge: MergeMode,
    /// Largest sequence count a file may declare
    pub table_size: usize,
    /// Fill missing packed-format names from the built-in table
    pub apply_default_names: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            merge: MergeMode::Replace,
            table_size: DEFAULT_TABLE_SIZE,
            apply_default_names: true,
        }
    }
}

impl DecodeOptions {
    pub fn patch() -> Self {
        Self {
            merge: MergeMode::Patch,
            ..Self::default()
        }
    }
}

/// What a decode absorbed on its way to a populated table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeReport {
    pub format: Option<Format>,
    pub sequences: usize,
    pub frames: usize,
    pub recovered: usize,
    pub unknown_tags: usize,
    pub skipped_tags: usize,
    pub resolved_aliases: usize,
    /// Byte span of the embedded sprite container, packed format only
    pub embedded_atlas: Option<Range<usize>>,
}

/// Per-call decode state: options in, diagnostics out
pub struct DecodeContext<'o> {
    pub opts: &'o DecodeOptions,
    report: DecodeReport,
}

impl<'o> DecodeContext<'o> {
    pub fn new(opts: &'o DecodeOptions) -> Self {
        Self {
            opts,
            report: DecodeReport::default(),
        }
    }

    pub fn report(&self) -> &DecodeReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut DecodeReport {
        &mut self.report
    }

    pub fn into_report(self) -> DecodeReport {
        self.report
    }

    /// Absorbs a non-fatal error: one log line, one count
    pub fn recover(&mut self, err: DecodeError) {
        match err.class {
            ErrorClass::UnknownTag => self.report.unknown_tags += 1,
            _ => self.report.recovered += 1,
        }
        log::warn!("{}", err);
    }

    pub fn unknown_tag(&mut self, tag: Tag, offset: usize, skipped: bool) {
        if skipped {
            self.report.skipped_tags += 1;
            log::warn!("skipping unknown tag {} at {:#x}", tag_name(tag), offset);
        } else {
            self.recover(DecodeError::unknown_tag(tag).with_arg("offset", format!("{offset:#x}")));
        }
    }
}
