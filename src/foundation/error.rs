/// Convenience result type used across strata.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error taxonomy used by scene, canvas and layer APIs.
#[derive(thiserror::Error, Debug)]
pub enum StrataError {
    /// Invalid construction input or a surface without a 2D context.
    #[error("construction error: {0}")]
    Construction(String),

    /// A referenced layer or shape does not exist.
    #[error("lookup error: {0}")]
    NotFound(String),

    /// The call is not valid in the current lifecycle state.
    #[error("state error: {0}")]
    State(String),

    /// Compositing or encoding an export failed.
    #[error("export error: {0}")]
    Export(String),

    /// An image or font could not be loaded.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors bubbled up from lower-level crates.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    /// Build a [`StrataError::Construction`] error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Build a [`StrataError::NotFound`] error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`StrataError::State`] error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`StrataError::Export`] error.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`StrataError::Resource`] error.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
