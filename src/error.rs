//! Error types shared by the loader, bridge, consent and share modules.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to fetch or instantiate the execution module.
///
/// Cloneable because one load attempt is awaited by every caller that joined
/// it, and each of them receives the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("engine bootstrap is not available")]
    MissingBootstrap,

    #[error("failed to fetch engine from {origin}: {details}")]
    Fetch { origin: String, details: String },

    #[error("failed to instantiate engine: {details}")]
    Instantiate { details: String },
}

/// The entry point returned something that is not a JSON result object.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Consent persistence failures. Callers log and ignore these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("consent storage unavailable at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognised consent value {0:?}")]
    InvalidValue(String),
}

/// A share link could not be turned back into source text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("link has no #code= fragment")]
    MissingFragment,

    #[error("fragment is not valid base64: {0}")]
    Base64(String),

    #[error("decoded fragment is not UTF-8")]
    Utf8,
}

/// Reasons the bridge produced no rendered outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("engine is not ready")]
    NotReady,

    #[error(transparent)]
    Load(#[from] LoadError),
}
