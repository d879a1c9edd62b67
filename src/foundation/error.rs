pub type GifViewResult<T> = Result<T, GifViewError>;

#[derive(thiserror::Error, Debug)]
pub enum GifViewError {
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("decode failure: {0}")]
    DecodeFailure(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // network or filesystem failure other than a missing resource
    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifViewError {
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::ResourceNotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Classify a `std::io::Error`, prefixing `what` to the message.
    ///
    /// `NotFound` becomes [`GifViewError::ResourceNotFound`] with a `file not found:` cause,
    /// everything else becomes [`GifViewError::Io`].
    pub fn from_io(what: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                Self::ResourceNotFound(format!("file not found: {what}: {err}"))
            }
            _ => Self::Io(format!("{what}: {err}")),
        }
    }
}

/// Failure of one background load, delivered through the failure callback.
///
/// `error` is the primary cause. Errors raised while cleaning up after it are kept in
/// `suppressed` instead of replacing it.
#[derive(Debug)]
pub struct LoadError {
    pub error: GifViewError,
    pub suppressed: Vec<GifViewError>,
}

impl LoadError {
    pub fn new(error: GifViewError) -> Self {
        Self {
            error,
            suppressed: Vec::new(),
        }
    }

    pub fn suppress(&mut self, err: GifViewError) {
        self.suppressed.push(err);
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot load gif: {}", self.error)?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} suppressed)", self.suppressed.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<GifViewError> for LoadError {
    fn from(error: GifViewError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
