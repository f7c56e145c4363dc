use thiserror::Error;

/// Errors raised while building layers or driving their audio.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayerError {
    /// A constructor argument would produce a degenerate layer or impulse.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The audio engine refused to create or wire a node.
    #[error("audio engine error: {0}")]
    Engine(String),

    /// Sample bytes could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Sample bytes were fetched but could not be decoded.
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// `start_audio` was called before a sample was attached.
    #[error("no sample loaded for layer `{0}`")]
    NotLoaded(String),
}

impl LayerError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayerError>;
