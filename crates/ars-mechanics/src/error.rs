//! Error types for the mechanics crate.

/// Errors that can occur during mechanics operations.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A scripted die face outside 0..=9.
    #[error("invalid d10 face: {0}")]
    InvalidFace(u32),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
