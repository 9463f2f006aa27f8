use crate::art::Art;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by record-level operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A vis deduction asked for more pawns than the stock holds.
    #[error("insufficient {art} vis: need {needed}, have {available}")]
    InsufficientVis {
        /// The Art whose pawns ran short.
        art: Art,
        /// Pawns requested.
        needed: u32,
        /// Pawns available.
        available: u32,
    },

    /// A string did not name one of the fifteen Hermetic Arts.
    #[error("unknown art: \"{0}\"")]
    UnknownArt(String),

    /// A string did not name a season.
    #[error("unknown season: \"{0}\"")]
    UnknownSeason(String),

    /// A string did not name a characteristic.
    #[error("unknown characteristic: \"{0}\"")]
    UnknownCharacteristic(String),

    /// A persisted document is internally inconsistent.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
