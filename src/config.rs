//! Options for the generator and the sync controller.
//!
//! Hosts send these as (partial) camelCase JSON; every field has a default.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FluxError, FluxResult};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_INDENT_WIDTH: usize = 2;
pub const DEFAULT_DOCUMENT_NAME: &str = "MyPage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodegenOptions {
    /// Spaces per nesting level in emitted markup and CSS.
    pub indent_width: usize,
    /// Used when neither the source nor the file path yields a name.
    pub default_name: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            default_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    pub history_limit: usize,
    /// Carry old ids onto structurally matching nodes after a reparse.
    pub preserve_ids_on_reparse: bool,
    pub codegen: CodegenOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            preserve_ids_on_reparse: true,
            codegen: CodegenOptions::default(),
        }
    }
}

impl SyncOptions {
    pub fn from_json(json: &str) -> FluxResult<Self> {
        let mut options: SyncOptions = serde_json::from_str(json)?;
        options.validate()?;
        if options.codegen.default_name.trim().is_empty() {
            warn!("empty defaultName in sync options, using {}", DEFAULT_DOCUMENT_NAME);
            options.codegen.default_name = DEFAULT_DOCUMENT_NAME.to_string();
        }
        Ok(options)
    }

    pub fn validate(&self) -> FluxResult<()> {
        if self.history_limit == 0 {
            return Err(FluxError::InvalidConfig(
                "historyLimit must be at least 1".to_string(),
            ));
        }
        if self.codegen.indent_width == 0 {
            return Err(FluxError::InvalidConfig(
                "codegen.indentWidth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SyncOptions::default();
        assert_eq!(options.history_limit, 50);
        assert!(options.preserve_ids_on_reparse);
        assert_eq!(options.codegen.indent_width, 2);
        assert_eq!(options.codegen.default_name, "MyPage");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options = SyncOptions::from_json(r#"{"historyLimit": 10, "codegen": {"indentWidth": 4}}"#).unwrap();
        assert_eq!(options.history_limit, 10);
        assert!(options.preserve_ids_on_reparse);
        assert_eq!(options.codegen.indent_width, 4);
        assert_eq!(options.codegen.default_name, "MyPage");
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(matches!(
            SyncOptions::from_json(r#"{"historyLimit": 0}"#),
            Err(FluxError::InvalidConfig(_))
        ));
        assert!(matches!(
            SyncOptions::from_json(r#"{"codegen": {"indentWidth": 0}}"#),
            Err(FluxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_blank_default_name_is_corrected() {
        let options = SyncOptions::from_json(r#"{"codegen": {"defaultName": "  "}}"#).unwrap();
        assert_eq!(options.codegen.default_name, "MyPage");
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        assert!(matches!(
            SyncOptions::from_json("{"),
            Err(FluxError::Serialization(_))
        ));
    }
}
