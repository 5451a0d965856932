use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {document}: {source}")]
    Parse {
        document: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed token node at `{path}` in {document}: {reason}")]
    MalformedNode {
        document: String,
        path: String,
        reason: String,
    },

    #[error("missing required token: {path} - check {document}")]
    MissingRootToken { path: String, document: String },

    #[error("required token {path} did not resolve to a literal (got `{value}`)")]
    UnresolvedRootToken { path: String, value: String },

    #[error("token directory not found: {0}")]
    MissingInputDir(PathBuf),

    #[error("no token files found in {0}")]
    NoTokenFiles(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("figma export error: {0}")]
    Figma(String),
}

impl TokenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TokenError::Io {
            path: path.into(),
            source,
        }
    }
}
