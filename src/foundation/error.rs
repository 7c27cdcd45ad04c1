//! The crate error taxonomy and its result alias.

/// Convenience result type used across wordbeat.
pub type WordbeatResult<T> = Result<T, WordbeatError>;

/// Top-level error taxonomy used by engine APIs.
///
/// User-initiated stop/cancel is deliberately *not* represented here: it is a
/// normal terminal transition, reported through events and stats rather than
/// through `Err`.
#[derive(thiserror::Error, Debug)]
pub enum WordbeatError {
    /// Invalid user-provided configuration, rejected before any scheduler
    /// starts (bad note token, malformed resolution, empty word list, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required external resource failed (encoder would not open, output
    /// path unwritable, font file unreadable).
    #[error("resource error: {0}")]
    Resource(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WordbeatError {
    /// Build a [`WordbeatError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`WordbeatError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
