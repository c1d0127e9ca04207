//! Decoder for fighting-game move lists: the native tag stream, the legacy
//! tag stream and the legacy packed layout all land in one [`MoveList`].

pub mod atlas;
pub mod error;
pub mod model;
pub mod parser;
pub mod settings;
pub mod writer;

pub const CONFY_APP_NAME: &str = "movelist";

pub use error::{DecodeError, ErrorClass, LoadError};
pub use model::{MergeMode, MoveList};
pub use parser::{DecodeOptions, DecodeReport, Format, decode, decode_with_report, detect, load_file};
pub use writer::{encode, write_native};
