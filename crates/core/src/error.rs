/// Result alias that carries the custom [`PlanError`] type.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The supplied audio cannot be analysed (empty buffer, non-positive
    /// duration). Fatal: there is nothing sensible to plan from.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),
    /// The caller referenced a catalog key that does not exist. Fatal: the
    /// caller must supply a valid key.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Wrapper around FFT failures in the spectral backend.
    #[error("fft error: {0}")]
    Fft(#[from] realfft::FftError),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialization errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl PlanError {
    /// Creates a [`PlanError::InvalidAudio`] from the provided message.
    pub fn invalid_audio<T: Into<String>>(msg: T) -> Self {
        Self::InvalidAudio(msg.into())
    }

    /// Creates a [`PlanError::Configuration`] from the provided message.
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }
}
