use thiserror::Error;

pub type FluxResult<T> = Result<T, FluxError>;

/// Failures inside the parser and option loading.
///
/// None of these cross the public parse/generate contract: `parse_flux_to_tree`
/// degrades every variant to an empty forest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FluxError {
    #[error("No `page Name {{` or `component Name(...) {{` declaration found")]
    MissingDeclaration,

    #[error("Unbalanced braces: block opened at byte {offset} is never closed")]
    UnbalancedBraces { offset: usize },

    #[error("Style block opened at byte {offset} is never closed")]
    UnterminatedStyleBlock { offset: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FluxError {
    fn from(err: serde_json::Error) -> Self {
        FluxError::Serialization(err.to_string())
    }
}
