use crate::error::DecodeError;
use crate::parser::context::DecodeContext;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

pub type Tag = [u8; 4];

/// Tags ending in '2' carry a u32 byte length and can be skipped blind
pub fn is_length_prefixed(tag: Tag) -> bool {
    tag[3] == b'2'
}

pub fn tag_name(tag: Tag) -> String {
    String::from_utf8_lossy(&tag).into_owned()
}

/// Word cursor over one tag stream. Reads never go past the slice handed to
/// `new`; running out surfaces as a `truncated` error.
pub struct TagCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

/// Result of handing a tag to a block handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    Unknown,
}

impl<'a> TagCursor<'a> {
    pub fn new(buf: &'a [u8], start: usize) -> Self {
        let mut inner = Cursor::new(buf);
        inner.set_position(start.min(buf.len()) as u64);
        Self { inner }
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.inner.get_ref().len().saturating_sub(self.position())
    }

    /// Fewer than four bytes left, so no further tag can start here
    pub fn at_end(&self) -> bool {
        self.remaining() < 4
    }

    pub fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    pub fn read_i32s<const N: usize>(&mut self) -> Result<[i32; N], DecodeError> {
        let mut out = [0i32; N];
        for v in out.iter_mut() {
            *v = self.read_i32()?;
        }
        Ok(out)
    }

    pub fn read_f32s<const N: usize>(&mut self) -> Result<[f32; N], DecodeError> {
        let mut out = [0f32; N];
        for v in out.iter_mut() {
            *v = self.read_f32()?;
        }
        Ok(out)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::field("truncated")
                .with_arg("offset", self.position())
                .with_arg("wanted", len)
                .with_arg("remaining", self.remaining()));
        }
        let buf: &'a [u8] = self.inner.get_ref();
        let start = self.position();
        self.inner.set_position((start + len) as u64);
        Ok(&buf[start..start + len])
    }

    /// Length-prefixed payload; the cursor ends on the next word boundary
    pub fn read_blob(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32()? as usize;
        let padded = len.checked_add(3).map(|n| n & !3).unwrap_or(usize::MAX);
        if padded > self.remaining() {
            return Err(DecodeError::field("blob-overrun")
                .with_arg("offset", self.position())
                .with_arg("length", len)
                .with_arg("remaining", self.remaining()));
        }
        let bytes = self.read_bytes(padded)?;
        Ok(&bytes[..len])
    }

    /// Moves past the next occurrence of `tag`, scanning word by word.
    /// Returns false and parks at the end if there is none.
    pub fn resync_past(&mut self, tag: Tag) -> bool {
        while !self.at_end() {
            match self.read_tag() {
                Ok(t) if t == tag => return true,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        let end = self.inner.get_ref().len();
        self.inner.set_position(end as u64);
        false
    }

    /// Runs one tag block: reads tags until `end_tag`, handing each to
    /// `handler`. Length-prefixed unknown tags are skipped; any other unknown
    /// tag abandons the block and resumes after its terminator. A recoverable
    /// handler error is counted and abandons the block the same way. Fatal
    /// errors and errors on an exhausted stream propagate.
    pub fn run_block<F>(
        &mut self,
        end_tag: Tag,
        ctx: &mut DecodeContext,
        mut handler: F,
    ) -> Result<(), DecodeError>
    where
        F: FnMut(Tag, &mut TagCursor<'a>, &mut DecodeContext) -> Result<Handled, DecodeError>,
    {
        loop {
            if self.at_end() {
                return Err(DecodeError::field("missing-terminator")
                    .with_arg("tag", tag_name(end_tag))
                    .with_arg("offset", self.position()));
            }
            let offset = self.position();
            let tag = self.read_tag()?;
            if tag == end_tag {
                return Ok(());
            }
            let handled = handler(tag, self, ctx).and_then(|handled| {
                if handled == Handled::Unknown && is_length_prefixed(tag) {
                    let len = self.read_blob()?.len();
                    ctx.unknown_tag(tag, offset, true);
                    log::debug!("skipped {} ({} bytes)", tag_name(tag), len);
                    return Ok(Handled::Yes);
                }
                Ok(handled)
            });
            match handled {
                Ok(Handled::Yes) => continue,
                Ok(Handled::Unknown) => ctx.unknown_tag(tag, offset, false),
                Err(err) if err.is_fatal() || self.at_end() => return Err(err),
                Err(err) => ctx.recover(err.with_arg("within", tag_name(tag))),
            }
            self.abandon(end_tag, tag, offset);
            return Ok(());
        }
    }

    fn abandon(&mut self, end_tag: Tag, tag: Tag, offset: usize) {
        if !self.resync_past(end_tag) {
            log::warn!(
                "no {} after {} at {:#x}",
                tag_name(end_tag),
                tag_name(tag),
                offset
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DecodeOptions;

    fn words(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn reads_are_bounded_by_the_slice() {
        let buf = [1u8, 0, 0, 0, 2, 0];
        let mut cursor = TagCursor::new(&buf, 0);
        assert_eq!(cursor.read_i32().unwrap(), 1);
        let err = cursor.read_i32().unwrap_err();
        assert_eq!(err.key, "truncated");
    }

    #[test]
    fn blob_is_padded_to_word_boundary() {
        let buf = words(&[&3u32.to_le_bytes(), b"abc\0", b"NEXT"]);
        let mut cursor = TagCursor::new(&buf, 0);
        assert_eq!(cursor.read_blob().unwrap(), b"abc");
        assert_eq!(&cursor.read_tag().unwrap(), b"NEXT");
    }

    #[test]
    fn oversized_blob_is_rejected() {
        let buf = words(&[&400u32.to_le_bytes(), b"abcd"]);
        let mut cursor = TagCursor::new(&buf, 0);
        assert_eq!(cursor.read_blob().unwrap_err().key, "blob-overrun");
    }

    #[test]
    fn unknown_fixed_tag_resyncs_after_terminator() {
        let buf = words(&[
            b"AAAA",
            &1i32.to_le_bytes(),
            b"ZZZZ",
            &9i32.to_le_bytes(),
            b"AAAA",
            &2i32.to_le_bytes(),
            b"_END",
            b"TAIL",
        ]);
        let opts = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&opts);
        let mut cursor = TagCursor::new(&buf, 0);
        let mut seen = Vec::new();
        cursor
            .run_block(*b"_END", &mut ctx, |tag, c, _| {
                if &tag == b"AAAA" {
                    seen.push(c.read_i32()?);
                    return Ok(Handled::Yes);
                }
                Ok(Handled::Unknown)
            })
            .unwrap();
        assert_eq!(seen, vec![1]);
        assert_eq!(&cursor.read_tag().unwrap(), b"TAIL");
        assert_eq!(ctx.report().unknown_tags, 1);
    }

    #[test]
    fn unknown_length_prefixed_tag_is_skipped() {
        let buf = words(&[
            b"XYZ2",
            &5u32.to_le_bytes(),
            b"hello\0\0\0",
            b"AAAA",
            &7i32.to_le_bytes(),
            b"_END",
        ]);
        let opts = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&opts);
        let mut cursor = TagCursor::new(&buf, 0);
        let mut seen = Vec::new();
        cursor
            .run_block(*b"_END", &mut ctx, |tag, c, _| {
                if &tag == b"AAAA" {
                    seen.push(c.read_i32()?);
                    return Ok(Handled::Yes);
                }
                Ok(Handled::Unknown)
            })
            .unwrap();
        assert_eq!(seen, vec![7]);
        assert_eq!(ctx.report().skipped_tags, 1);
    }

    #[test]
    fn field_error_abandons_only_its_block() {
        let buf = words(&[
            b"NAM2",
            &0xFFFFu32.to_le_bytes(),
            b"AAAA",
            &3i32.to_le_bytes(),
            b"_END",
            b"TAIL",
        ]);
        let opts = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&opts);
        let mut cursor = TagCursor::new(&buf, 0);
        let mut seen = Vec::new();
        cursor
            .run_block(*b"_END", &mut ctx, |tag, c, _| {
                match &tag {
                    b"NAM2" => {
                        c.read_blob()?;
                    }
                    b"AAAA" => seen.push(c.read_i32()?),
                    _ => return Ok(Handled::Unknown),
                }
                Ok(Handled::Yes)
            })
            .unwrap();
        assert!(seen.is_empty());
        assert_eq!(&cursor.read_tag().unwrap(), b"TAIL");
        assert_eq!(ctx.report().recovered, 1);
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let buf = words(&[b"AAAA", &1i32.to_le_bytes()]);
        let opts = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&opts);
        let mut cursor = TagCursor::new(&buf, 0);
        let err = cursor
            .run_block(*b"_END", &mut ctx, |_, c, _| {
                c.read_i32()?;
                Ok(Handled::Yes)
            })
            .unwrap_err();
        assert_eq!(err.key, "missing-terminator");
    }
}
