/// Convenience result type used across glimmer.
pub type GlimmerResult<T> = Result<T, GlimmerError>;

/// Top-level error taxonomy.
///
/// Motion functions are total and never produce errors; everything here comes from the
/// configuration, lifecycle, rendering or output boundary.
#[derive(thiserror::Error, Debug)]
pub enum GlimmerError {
    /// Invalid scene configuration or API arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stage was used after it was unmounted.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Rasterization or surface failures.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink failures (PNG writing, ffmpeg).
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing scene documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlimmerError {
    /// Build a [`GlimmerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlimmerError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`GlimmerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GlimmerError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`GlimmerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
