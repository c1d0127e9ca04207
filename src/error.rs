use std::{collections::BTreeMap, fmt, io, sync::Arc};

/// How far a decode error reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Top-level header or offset table unusable; the whole load fails
    FatalFormat,
    /// One field, record or sequence skipped
    RecoverableField,
    /// Tag of unknown shape; the enclosing block is abandoned
    UnknownTag,
}

#[derive(Debug, Clone)]
pub struct DecodeError {
    pub class: ErrorClass,
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<DecodeCause>,
}

#[derive(Debug, Clone)]
pub enum DecodeCause {
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    pub fn new(class: ErrorClass, key: &'static str) -> Self {
        Self {
            class,
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn fatal(key: &'static str) -> Self {
        Self::new(ErrorClass::FatalFormat, key)
    }

    pub fn field(key: &'static str) -> Self {
        Self::new(ErrorClass::RecoverableField, key)
    }

    pub fn unknown_tag(tag: [u8; 4]) -> Self {
        Self::new(ErrorClass::UnknownTag, "unknown-tag")
            .with_arg("tag", String::from_utf8_lossy(&tag))
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    /// Re-classifies an error; used when a field failure means the whole
    /// header is untrustworthy
    pub fn escalate(mut self) -> Self {
        self.class = ErrorClass::FatalFormat;
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(DecodeCause::Std(Arc::new(cause)));
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.class == ErrorClass::FatalFormat
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            DecodeCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        let key = if err.kind() == io::ErrorKind::UnexpectedEof {
            "truncated"
        } else {
            "io-error"
        };
        DecodeError::field(key).push_std(err)
    }
}

/// What the caller of `decode`/`load_file` sees. Anything short of a fatal
/// error is absorbed into the model and the log.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unrecognized move list format")]
    Unrecognized,
    #[error("fatal format error: {0}")]
    Fatal(DecodeError),
    #[error("cannot read {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl From<DecodeError> for LoadError {
    fn from(err: DecodeError) -> Self {
        LoadError::Fatal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_in_order() {
        let err = DecodeError::field("bad-offset")
            .with_arg("sequence", 3)
            .with_arg("offset", 0x40);
        assert_eq!(err.to_string(), "bad-offset(offset=64, sequence=3)");
    }

    #[test]
    fn eof_maps_to_recoverable_truncation() {
        let err: DecodeError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert_eq!(err.key, "truncated");
        assert_eq!(err.class, ErrorClass::RecoverableField);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.escalate().is_fatal());
    }
}
