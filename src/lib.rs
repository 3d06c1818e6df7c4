mod action;
mod domain;
mod error;
mod planner;
mod search;
mod state;

pub use action::Action;
pub use domain::{Domain, DomainBuilder};
pub use error::{PlanError, Result};
pub use planner::{replay, Planner};
pub use search::{
    BestFirstSearch, BreadthFirstSearch, HeuristicStrategy, MisplacedObjects, SearchAlgorithm,
    SearchLimits, SearchOutcome, ZeroHeuristic,
};
pub use state::{Goal, WorldState};
