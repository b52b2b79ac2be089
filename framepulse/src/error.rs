use thiserror::Error;

/// Errors produced while aggregating a run's history into segments.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// Boundary events must be strictly increasing; anything else means the
    /// event log is corrupt.
    #[error("segment boundaries out of order: {next_ms} ms follows {previous_ms} ms")]
    UnorderedBoundaries {
        /// Boundary preceding the violation.
        previous_ms: i64,
        /// The offending boundary.
        next_ms: i64,
    },
}
