use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use slim_dom::MemoConfig;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "paperclip.editor.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo steps kept per document (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Query cache tunables for the editing thread
    #[serde(default)]
    pub memo: MemoConfig,
}

fn default_max_undo_levels() -> usize {
    100
}

impl EditorConfig {
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory, falling back to defaults when the file
    /// does not exist
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Installs the memo settings on the calling thread
    pub fn apply_memo_config(&self) {
        slim_dom::configure_memo(self.memo.clone());
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_levels: default_max_undo_levels(),
            memo: MemoConfig::default(),
        }
    }
}
