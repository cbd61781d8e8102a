use thiserror::Error;

/// Errors raised while building or interpreting model values locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A media kind string was not one of `image`, `video` or `audio`.
    #[error("unknown media kind: {0}")]
    UnknownMediaKind(String),

    /// A blueprint section name did not match any known section.
    #[error("unknown blueprint section: {0}")]
    UnknownSection(String),
}
