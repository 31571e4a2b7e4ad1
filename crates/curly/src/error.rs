//! Error types for template compilation and rendering.

use std::io;

/// Errors that can occur while compiling or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Template source is malformed. Carries the line the parser was on.
    #[error("parse error on line {line}: {msg}")]
    Parse { msg: String, line: usize },

    /// A partial could not be fetched from the configured [`TemplateSource`].
    ///
    /// [`TemplateSource`]: crate::TemplateSource
    #[error("unable to load template '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Partial inclusion exceeded the nesting limit, almost certainly a
    /// template that includes itself directly or transitively.
    #[error("template '{name}' nested deeper than {limit} partials (include cycle?)")]
    IncludeDepth { name: String, limit: usize },

    /// Reading template source failed.
    #[error("failed to read template source: {0}")]
    Io(#[from] io::Error),

    /// Render data could not be serialized into a value tree.
    #[error("failed to serialize render data: {0}")]
    Data(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(msg: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            msg: msg.into(),
            line,
        }
    }

    /// The source line this error points at, for parse errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
