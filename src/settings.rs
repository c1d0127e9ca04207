use crate::CONFY_APP_NAME;
use crate::model::{DEFAULT_TABLE_SIZE, MergeMode};
use crate::parser::DecodeOptions;

use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFY_CONFIG_NAME: &str = "decoder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderSettings {
    pub table_size: usize,
    pub apply_default_names: bool,
    pub merge: MergeMode,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            apply_default_names: true,
            merge: MergeMode::Replace,
        }
    }
}

impl DecoderSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, CONFY_CONFIG_NAME).unwrap_or_else(|err| {
            log::warn!("decoder settings unreadable, using defaults: {}", err);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, confy::ConfyError> {
        confy::load_path(path)
    }

    pub fn save(&self) {
        if let Err(err) = confy::store(CONFY_APP_NAME, CONFY_CONFIG_NAME, self) {
            log::warn!("failed to store decoder settings: {}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), confy::ConfyError> {
        confy::store_path(path, self)
    }

    pub fn to_options(&self) -> DecodeOptions {
        DecodeOptions {
            merge: self.merge,
            table_size: self.table_size,
            apply_default_names: self.apply_default_names,
        }
    }
}
