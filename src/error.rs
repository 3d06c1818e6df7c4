use thiserror::Error;

/// Errors raised while building domains and states or while searching.
///
/// An unreachable goal is not an error: planners report it as a
/// [`SearchOutcome`](crate::SearchOutcome) without a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// `support`/`clear` tables violate the world-state invariants
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The domain configuration references unknown objects or locations
    #[error("Malformed domain: {0}")]
    MalformedDomain(String),

    /// A cycle or dangling link was found while resolving a stack's location
    #[error("Malformed state: {0}")]
    MalformedState(String),

    /// An action in a replayed plan was refused by the state it was applied to
    #[error("Action rejected: {0}")]
    ActionRejected(String),

    /// The search hit its configured expansion cap before finishing
    #[error("Expansion limit of {0} states reached")]
    ExpansionLimit(usize),
}

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
