use crate::{Action, PlanError, Result, WorldState};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet, VecDeque};

/// Result of one planning call.
///
/// `plan` is `None` when the goal is unreachable from the initial state;
/// that is a normal outcome, not an error. `states_expanded` counts the
/// non-goal states whose successors were generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub plan: Option<Vec<Action>>,
    pub states_expanded: usize,
}

impl SearchOutcome {
    pub fn found(plan: Vec<Action>, states_expanded: usize) -> Self {
        Self {
            plan: Some(plan),
            states_expanded,
        }
    }

    pub fn exhausted(states_expanded: usize) -> Self {
        Self {
            plan: None,
            states_expanded,
        }
    }

    pub fn is_found(&self) -> bool {
        self.plan.is_some()
    }
}

/// Defensive bounds applied to a single search call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of states to expand; `None` explores the whole
    /// reachable space.
    pub max_expansions: Option<usize>,
}

impl SearchLimits {
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    fn check(&self, states_expanded: usize) -> Result<()> {
        match self.max_expansions {
            Some(limit) if states_expanded >= limit => {
                log::warn!("search stopped after expanding {} states", limit);
                Err(PlanError::ExpansionLimit(limit))
            }
            _ => Ok(()),
        }
    }
}

/// Trait defining the interface for search strategies.
///
/// Implementations must be deterministic: the same initial state always
/// produces the same outcome.
///
/// # Examples
///
/// ```
/// use stackplan::{Result, SearchAlgorithm, SearchOutcome, WorldState};
///
/// /// Only succeeds when the goal already holds.
/// struct AlreadyThere;
///
/// impl SearchAlgorithm for AlreadyThere {
///     fn search(&self, initial: &WorldState) -> Result<SearchOutcome> {
///         if initial.is_goal() {
///             Ok(SearchOutcome::found(Vec::new(), 0))
///         } else {
///             Ok(SearchOutcome::exhausted(0))
///         }
///     }
/// }
/// ```
pub trait SearchAlgorithm {
    /// Searches for a sequence of actions that turns `initial` into a state
    /// satisfying its goal.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if a corrupted state is met, or
    /// [`PlanError::ExpansionLimit`] if the configured limit is reached.
    fn search(&self, initial: &WorldState) -> Result<SearchOutcome>;
}

/// A trait for estimating the number of moves left to reach the goal.
pub trait HeuristicStrategy: Send + Sync {
    fn estimate(&self, state: &WorldState) -> usize;
}

/// Counts goal entries that do not hold yet.
///
/// Not admissible in general, so a best-first search guided by it may
/// return plans longer than the shortest one.
pub struct MisplacedObjects;

impl HeuristicStrategy for MisplacedObjects {
    fn estimate(&self, state: &WorldState) -> usize {
        state.goal_mismatches()
    }
}

/// Zero heuristic; turns best-first search into uniform-cost search.
pub struct ZeroHeuristic;

impl HeuristicStrategy for ZeroHeuristic {
    fn estimate(&self, _state: &WorldState) -> usize {
        0
    }
}

/// Represents a node in the search tree.
#[derive(Debug, Clone)]
struct Node {
    state: WorldState,
    parent: Option<usize>,
    /// Action that led to this state from the parent
    action: Option<Action>,
    /// Number of actions from the initial state
    depth: usize,
}

/// Arena of every node generated during one search.
struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    fn new(initial: &WorldState) -> Self {
        Self {
            nodes: vec![Node {
                state: initial.clone(),
                parent: None,
                action: None,
                depth: 0,
            }],
        }
    }

    fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    fn push(&mut self, parent: usize, action: Action, state: WorldState) -> usize {
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            state,
            parent: Some(parent),
            action: Some(action),
            depth,
        });
        self.nodes.len() - 1
    }

    /// Reconstructs the path from the initial state to the given node.
    fn reconstruct_path(&self, node_idx: usize) -> Vec<Action> {
        let mut path = Vec::with_capacity(self.nodes[node_idx].depth);
        let mut current = Some(node_idx);

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if let Some(action) = &node.action {
                path.push(action.clone());
            }
            current = node.parent;
        }

        path.reverse();
        path
    }
}

/// Level-order graph search.
///
/// Returns a plan with the fewest actions, or reports that no plan exists
/// after exhausting the reachable state space.
#[derive(Debug, Default, Clone)]
pub struct BreadthFirstSearch {
    limits: SearchLimits,
}

impl BreadthFirstSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Self { limits }
    }
}

impl SearchAlgorithm for BreadthFirstSearch {
    fn search(&self, initial: &WorldState) -> Result<SearchOutcome> {
        log::debug!("breadth-first search from {:?}", initial);

        let mut tree = SearchTree::new(initial);
        let mut frontier = VecDeque::from([0]);
        // States are marked on first discovery so the frontier never holds
        // two copies of the same state.
        let mut seen: HashSet<WorldState> = HashSet::from([initial.clone()]);
        let mut states_expanded = 0;

        while let Some(current) = frontier.pop_front() {
            let node = tree.node(current);
            if node.state.is_goal() {
                let plan = tree.reconstruct_path(current);
                log::debug!(
                    "breadth-first found a {}-action plan after {} expansions",
                    plan.len(),
                    states_expanded
                );
                return Ok(SearchOutcome::found(plan, states_expanded));
            }

            self.limits.check(states_expanded)?;
            states_expanded += 1;
            log::trace!("expanding depth {} {:?}", node.depth, node.state);

            for (action, next) in node.state.successors()? {
                if seen.insert(next.clone()) {
                    let idx = tree.push(current, action, next);
                    frontier.push_back(idx);
                }
            }
        }

        log::debug!(
            "breadth-first exhausted the state space after {} expansions",
            states_expanded
        );
        Ok(SearchOutcome::exhausted(states_expanded))
    }
}

/// Priority queue entry; ordered by `f_cost`, then insertion sequence.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    f_cost: usize,
    /// Strictly increasing insertion counter for stable tie-breaking
    sequence: u64,
    idx: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Best-first search ordered by `moves so far + heuristic estimate`.
///
/// With [`MisplacedObjects`] the returned plan is not guaranteed to be the
/// shortest one.
pub struct BestFirstSearch {
    heuristic: Box<dyn HeuristicStrategy>,
    limits: SearchLimits,
}

impl BestFirstSearch {
    /// Creates a new best-first search with the given heuristic.
    pub fn new(heuristic: Box<dyn HeuristicStrategy>) -> Self {
        Self {
            heuristic,
            limits: SearchLimits::default(),
        }
    }

    /// Creates a new best-first search guided by [`MisplacedObjects`].
    pub fn with_default_heuristic() -> Self {
        Self::new(Box::new(MisplacedObjects))
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for BestFirstSearch {
    fn default() -> Self {
        Self::with_default_heuristic()
    }
}

impl SearchAlgorithm for BestFirstSearch {
    fn search(&self, initial: &WorldState) -> Result<SearchOutcome> {
        log::debug!("best-first search from {:?}", initial);

        let mut tree = SearchTree::new(initial);
        let mut open_set = BinaryHeap::from([Reverse(QueueEntry {
            f_cost: self.heuristic.estimate(initial),
            sequence: 0,
            idx: 0,
        })]);
        let mut explored: HashSet<WorldState> = HashSet::new();
        let mut sequence = 0;
        let mut states_expanded = 0;

        while let Some(Reverse(entry)) = open_set.pop() {
            let node = tree.node(entry.idx);
            if explored.contains(&node.state) {
                continue;
            }
            if node.state.is_goal() {
                let plan = tree.reconstruct_path(entry.idx);
                log::debug!(
                    "best-first found a {}-action plan after {} expansions",
                    plan.len(),
                    states_expanded
                );
                return Ok(SearchOutcome::found(plan, states_expanded));
            }

            self.limits.check(states_expanded)?;
            explored.insert(node.state.clone());
            states_expanded += 1;
            log::trace!("expanding f={} {:?}", entry.f_cost, node.state);

            let g_cost = node.depth + 1;
            for (action, next) in node.state.successors()? {
                if explored.contains(&next) {
                    continue;
                }
                let f_cost = g_cost + self.heuristic.estimate(&next);
                sequence += 1;
                let idx = tree.push(entry.idx, action, next);
                open_set.push(Reverse(QueueEntry {
                    f_cost,
                    sequence,
                    idx,
                }));
            }
        }

        log::debug!(
            "best-first exhausted the state space after {} expansions",
            states_expanded
        );
        Ok(SearchOutcome::exhausted(states_expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Goal};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Two connected floors, every object may rest on any other surface.
    fn two_floors(goal: Goal) -> WorldState {
        let domain = Domain::builder()
            .objects(["A", "B", "C"])
            .locations(["L1", "L2"])
            .connect("L1", "L2")
            .allow("A", ["B", "C", "L1", "L2"])
            .allow("B", ["A", "C", "L1", "L2"])
            .allow("C", ["A", "B", "L1", "L2"])
            .build()
            .unwrap();
        WorldState::from_support(
            map(&[("A", "L1"), ("B", "A"), ("C", "L2")]),
            Arc::new(domain),
            goal,
        )
        .unwrap()
    }

    fn names(plan: &[Action]) -> Vec<String> {
        plan.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_queue_entry_ordering() {
        let low = QueueEntry { f_cost: 1, sequence: 5, idx: 9 };
        let high = QueueEntry { f_cost: 2, sequence: 0, idx: 0 };
        let tie = QueueEntry { f_cost: 1, sequence: 6, idx: 1 };
        assert!(low < high);
        assert!(low < tie);

        let mut heap = BinaryHeap::from([Reverse(high), Reverse(tie), Reverse(low)]);
        assert_eq!(heap.pop().map(|r| r.0.sequence), Some(5));
        assert_eq!(heap.pop().map(|r| r.0.sequence), Some(6));
        assert_eq!(heap.pop().map(|r| r.0.sequence), Some(0));
    }

    #[test]
    fn test_heuristics() {
        let state = two_floors(map(&[("A", "B"), ("B", "C"), ("C", "L2")]));
        assert_eq!(MisplacedObjects.estimate(&state), 2);
        assert_eq!(ZeroHeuristic.estimate(&state), 0);
    }

    #[test]
    fn test_breadth_first_search() {
        let state = two_floors(map(&[("A", "B"), ("B", "C")]));
        let outcome = BreadthFirstSearch::new().search(&state).unwrap();
        assert_eq!(
            names(&outcome.plan.unwrap()),
            ["move(B, A, C)", "move(A, L1, B)"]
        );
        assert_eq!(outcome.states_expanded, 3);
    }

    #[test]
    fn test_best_first_search() {
        let state = two_floors(map(&[("A", "B"), ("B", "C")]));
        let outcome = BestFirstSearch::default().search(&state).unwrap();
        assert_eq!(
            names(&outcome.plan.unwrap()),
            ["move(B, A, C)", "move(A, L1, B)"]
        );
        assert_eq!(outcome.states_expanded, 2);
    }

    #[test]
    fn test_goal_already_satisfied() {
        let state = two_floors(map(&[("B", "A")]));
        let bfs = BreadthFirstSearch::new().search(&state).unwrap();
        assert_eq!(bfs, SearchOutcome::found(Vec::new(), 0));
        let best = BestFirstSearch::default().search(&state).unwrap();
        assert_eq!(best, SearchOutcome::found(Vec::new(), 0));
    }

    #[test]
    fn test_expansion_limit() {
        let state = two_floors(map(&[("A", "B"), ("B", "C")]));
        let limits = SearchLimits::default().with_max_expansions(1);

        let result = BreadthFirstSearch::with_limits(limits).search(&state);
        assert_eq!(result, Err(PlanError::ExpansionLimit(1)));

        let result = BestFirstSearch::new(Box::new(ZeroHeuristic))
            .with_limits(limits)
            .search(&state);
        assert_eq!(result, Err(PlanError::ExpansionLimit(1)));
    }

    #[test]
    fn test_limit_not_hit_when_goal_found_in_time() {
        let state = two_floors(map(&[("A", "B"), ("B", "C")]));
        let limits = SearchLimits::default().with_max_expansions(3);
        let outcome = BreadthFirstSearch::with_limits(limits)
            .search(&state)
            .unwrap();
        assert!(outcome.is_found());
    }
}
