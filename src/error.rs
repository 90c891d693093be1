use thiserror::Error;

/// Rejected puzzle descriptors. Raised when a face-turning spec is built, so a
/// malformed vocabulary never reaches the sampling loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrambleError {
    #[error("face-turning puzzle has no faces")]
    NoFaces,

    #[error("face {face} has no candidate moves")]
    NoCandidateMoves { face: String },

    #[error("face {face} is assigned to more than one axis")]
    InconsistentAxis { face: String },

    #[error("need at least 3 distinct faces, found {found}")]
    TooFewFaces { found: usize },

    #[error("need faces on at least 2 axes, found {found}")]
    TooFewAxes { found: usize },
}

/// Reasons a manually typed solve time is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("no time entered")]
    Empty,

    #[error("'{0}' is not a time")]
    NotNumeric(String),

    #[error("time must be greater than zero")]
    NonPositive,

    #[error("time must be under 24 hours")]
    TooLong,
}

/// Failures editing a solve history.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no solve with id {0}")]
    UnknownSolve(u64),

    #[error(transparent)]
    InvalidTime(#[from] TimeParseError),
}

/// Failures reading or writing persisted solves.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to create directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt solve row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}
