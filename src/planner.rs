//! # Planner Module
//!
//! The planner is the entry point for turning an initial [`WorldState`]
//! into a sequence of [`Action`]s that reaches its goal. It owns a single
//! boxed [`SearchAlgorithm`] and is stateless between calls: planning the
//! same state twice yields the same outcome.
//!
//! Two strategies ship with the crate:
//!
//! - [`Planner::breadth_first`] always returns a plan with the fewest
//!   actions and serves as the reference for optimal plan length.
//! - [`Planner::best_first`] orders the frontier by moves taken plus the
//!   number of unsatisfied goal entries. It usually expands fewer states,
//!   but its plans are not guaranteed to be the shortest.
//!
//! ## Basic Usage
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use stackplan::{Domain, Planner, WorldState};
//!
//! let domain = Domain::builder()
//!     .objects(["A", "B"])
//!     .locations(["Floor1", "Floor2"])
//!     .connect("Floor1", "Floor2")
//!     .allow("A", ["B", "Floor1", "Floor2"])
//!     .allow("B", ["Floor1", "Floor2"])
//!     .build()
//!     .unwrap();
//!
//! let support = HashMap::from([
//!     ("A".to_string(), "Floor1".to_string()),
//!     ("B".to_string(), "Floor2".to_string()),
//! ]);
//! let goal = HashMap::from([("A".to_string(), "B".to_string())]);
//! let initial = WorldState::from_support(support, Arc::new(domain), goal).unwrap();
//!
//! let outcome = Planner::breadth_first().plan(&initial).unwrap();
//! let plan = outcome.plan.unwrap();
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].to_string(), "move(A, Floor1, B)");
//!
//! let end = stackplan::replay(&initial, &plan).unwrap();
//! assert!(end.is_goal());
//! ```

use crate::search::{BestFirstSearch, BreadthFirstSearch, SearchAlgorithm, SearchOutcome};
use crate::{Action, PlanError, Result, WorldState};

/// Finds plans using a configurable search strategy.
pub struct Planner {
    search_algorithm: Box<dyn SearchAlgorithm + Send + Sync>,
}

impl Planner {
    /// Creates a planner backed by [`BreadthFirstSearch`].
    pub fn breadth_first() -> Self {
        Self::with_search_algorithm(Box::new(BreadthFirstSearch::new()))
    }

    /// Creates a planner backed by [`BestFirstSearch`] with the misplaced
    /// objects heuristic.
    pub fn best_first() -> Self {
        Self::with_search_algorithm(Box::new(BestFirstSearch::default()))
    }

    /// Creates a planner with a custom search algorithm.
    ///
    /// ```
    /// use stackplan::{BestFirstSearch, Planner, SearchLimits, ZeroHeuristic};
    ///
    /// let search = BestFirstSearch::new(Box::new(ZeroHeuristic))
    ///     .with_limits(SearchLimits::default().with_max_expansions(10_000));
    /// let planner = Planner::with_search_algorithm(Box::new(search));
    /// ```
    pub fn with_search_algorithm(search_algorithm: Box<dyn SearchAlgorithm + Send + Sync>) -> Self {
        Self { search_algorithm }
    }

    /// Searches for a plan from `initial` to a state satisfying its goal.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if the search meets a corrupted
    /// state, or [`PlanError::ExpansionLimit`] if the search algorithm was
    /// given a limit and reached it. An unreachable goal is reported as an
    /// outcome without a plan.
    pub fn plan(&self, initial: &WorldState) -> Result<SearchOutcome> {
        self.search_algorithm.search(initial)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::best_first()
    }
}

/// Applies `plan` to `initial` in order and returns the final state.
///
/// # Errors
///
/// Returns [`PlanError::ActionRejected`] naming the first action the
/// current state refuses.
pub fn replay(initial: &WorldState, plan: &[Action]) -> Result<WorldState> {
    let mut state = initial.clone();
    for (step, action) in plan.iter().enumerate() {
        state = state.apply(action)?.ok_or_else(|| {
            PlanError::ActionRejected(format!("step {}: {}", step + 1, action))
        })?;
    }
    Ok(state)
}
