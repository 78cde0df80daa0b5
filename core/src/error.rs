//! Errors for the fallible edges of the crate: configuration files and
//! input-method tables. Typing itself never fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown input method: {0}")]
    UnknownInputMethod(String),

    /// A table entry whose key is not exactly one character.
    #[error("invalid key {key:?} in definition {definition:?}")]
    InvalidKeyDefinition { key: String, definition: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
