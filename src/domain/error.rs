//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the puzzle model.
/// These are independent of I/O and configuration concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("weight cannot sit on the pivot (distance 0)")]
    ZeroDistance,

    #[error("beam cannot hang at distance {0}: must be finite")]
    InvalidDistance(f64),

    #[error("invalid mass {mass} at distance {distance}: must be finite and >= 0")]
    InvalidMass { distance: f64, mass: f64 },

    #[error("{count} unknown weights found (in: {}), at most one can be inferred", beams.join(", "))]
    MultipleUnknownWeights { count: usize, beams: Vec<String> },

    #[error("line {line}: beam '{beam}' references undefined beam '{reference}'")]
    DanglingReference {
        line: usize,
        beam: String,
        reference: String,
    },

    #[error("cycle detected: '{child}' cannot hang below '{parent}'")]
    CycleDetected { parent: String, child: String },

    #[error("beam defined more than once: {0}")]
    DuplicateBeam(String),

    #[error("line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("puzzle contains no beams")]
    EmptyPuzzle,

    #[error("no beam named '{0}'")]
    UnknownBeam(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
