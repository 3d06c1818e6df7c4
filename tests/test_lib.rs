use stackplan::{
    replay, Action, BestFirstSearch, Domain, Goal, PlanError, Planner, SearchLimits, WorldState,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Three floors in a row, where `A` fits on anything, `B` on `C` or a floor,
/// and `C` only on a floor.
fn three_floor_domain() -> Arc<Domain> {
    Arc::new(
        Domain::builder()
            .objects(["A", "B", "C"])
            .locations(["L1", "L2", "L3"])
            .connect("L1", "L2")
            .connect("L2", "L3")
            .allow("A", ["B", "C", "L1", "L2", "L3"])
            .allow("B", ["C", "L1", "L2", "L3"])
            .allow("C", ["L1", "L2", "L3"])
            .build()
            .unwrap(),
    )
}

/// Tower `A` on `B` on `C` standing on `L1`.
fn tower_on_first_floor(goal: Goal) -> WorldState {
    let clear: HashMap<String, bool> = [
        ("A", true),
        ("B", false),
        ("C", false),
        ("L1", false),
        ("L2", true),
        ("L3", true),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), *v))
    .collect();
    WorldState::new(
        map(&[("A", "B"), ("B", "C"), ("C", "L1")]),
        clear,
        three_floor_domain(),
        goal,
    )
    .unwrap()
}

fn move_tower_goal() -> Goal {
    map(&[("A", "B"), ("B", "C"), ("C", "L3")])
}

/// Does any sequence of at most `depth` legal actions reach the goal?
fn reachable_within(state: &WorldState, depth: usize) -> bool {
    if state.is_goal() {
        return true;
    }
    if depth == 0 {
        return false;
    }
    state
        .successors()
        .unwrap()
        .iter()
        .any(|(_, next)| reachable_within(next, depth - 1))
}

#[test]
fn test_move_tower_across_floors() {
    let initial = tower_on_first_floor(move_tower_goal());

    let bfs = Planner::breadth_first().plan(&initial).unwrap();
    let plan = bfs.plan.expect("tower can be moved");
    assert_eq!(plan.len(), 26);
    assert_eq!(bfs.states_expanded, 26);
    assert_eq!(plan[0], Action::new("A", "B", "L2"));
    assert_eq!(plan.last(), Some(&Action::new("A", "L2", "B")));
    assert!(plan.contains(&Action::new("C", "L1", "L2")));
    assert!(plan.contains(&Action::new("C", "L2", "L3")));

    let end = replay(&initial, &plan).unwrap();
    assert!(end.is_goal());
    assert_eq!(end.support_of("C"), Some("L3"));
}

#[test]
fn test_best_first_plan_is_valid() {
    let initial = tower_on_first_floor(move_tower_goal());
    let shortest = Planner::breadth_first()
        .plan(&initial)
        .unwrap()
        .plan
        .unwrap();

    let outcome = Planner::best_first().plan(&initial).unwrap();
    assert!(outcome.states_expanded >= 1);
    let plan = outcome.plan.expect("best-first also finds a plan");
    assert!(plan.len() >= shortest.len());
    assert!(replay(&initial, &plan).unwrap().is_goal());
}

#[test]
fn test_planning_is_deterministic() {
    let initial = tower_on_first_floor(move_tower_goal());
    for planner in [Planner::breadth_first(), Planner::best_first()] {
        let first = planner.plan(&initial).unwrap();
        for _ in 0..3 {
            assert_eq!(planner.plan(&initial).unwrap(), first);
        }
        let fresh = tower_on_first_floor(move_tower_goal());
        assert_eq!(planner.plan(&fresh).unwrap(), first);
    }
}

#[test]
fn test_breadth_first_is_shortest() {
    let base = tower_on_first_floor(Goal::new());
    for goal in [
        map(&[("A", "L3")]),
        map(&[("A", "L2"), ("B", "L3")]),
        map(&[("C", "L2")]),
    ] {
        let initial = base.with_goal(goal).unwrap();
        let plan = Planner::breadth_first()
            .plan(&initial)
            .unwrap()
            .plan
            .unwrap();
        assert!(reachable_within(&initial, plan.len()));
        assert!(!reachable_within(&initial, plan.len() - 1));
    }
}

#[test]
fn test_unreachable_goal_reports_no_plan() {
    // C may only ever rest on a floor
    let initial = tower_on_first_floor(map(&[("C", "B")]));

    let bfs = Planner::breadth_first().plan(&initial).unwrap();
    assert!(bfs.plan.is_none());
    assert_eq!(bfs.states_expanded, 27);

    let best = Planner::best_first().plan(&initial).unwrap();
    assert!(!best.is_found());
    assert_eq!(best.states_expanded, 27);
}

#[test]
fn test_reachable_state_graph() {
    let initial = tower_on_first_floor(Goal::new());
    let mut seen = HashSet::from([initial.clone()]);
    let mut stack = vec![initial];
    while let Some(state) = stack.pop() {
        for (_, next) in state.successors().unwrap() {
            if seen.insert(next.clone()) {
                stack.push(next);
            }
        }
    }
    assert_eq!(seen.len(), 27);
}

#[test]
fn test_one_way_adjacency() {
    let domain = Arc::new(
        Domain::builder()
            .object("A")
            .locations(["L1", "L2"])
            .adjacent("L1", "L2")
            .allow("A", ["L1", "L2"])
            .build()
            .unwrap(),
    );

    let forward = WorldState::from_support(
        map(&[("A", "L1")]),
        Arc::clone(&domain),
        map(&[("A", "L2")]),
    )
    .unwrap();
    let outcome = Planner::breadth_first().plan(&forward).unwrap();
    assert_eq!(outcome.plan, Some(vec![Action::new("A", "L1", "L2")]));

    let backward =
        WorldState::from_support(map(&[("A", "L2")]), domain, map(&[("A", "L1")])).unwrap();
    let outcome = Planner::breadth_first().plan(&backward).unwrap();
    assert_eq!(outcome.plan, None);
    assert_eq!(outcome.states_expanded, 1);
}

#[test]
fn test_expansion_limit_is_an_error() {
    let initial = tower_on_first_floor(move_tower_goal());
    let search = BestFirstSearch::default()
        .with_limits(SearchLimits::default().with_max_expansions(5));
    let result = Planner::with_search_algorithm(Box::new(search)).plan(&initial);
    assert_eq!(result, Err(PlanError::ExpansionLimit(5)));
}

#[test]
fn test_concurrent_planning_shares_domain() {
    let initial = tower_on_first_floor(move_tower_goal());
    let expected = Planner::breadth_first().plan(&initial).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| Planner::breadth_first().plan(&initial).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_malformed_domain_rejected_at_construction() {
    let result = Domain::builder()
        .objects(["A"])
        .locations(["L1"])
        .allow("A", ["Shelf"])
        .build();
    assert!(matches!(result, Err(PlanError::MalformedDomain(_))));
}

#[test]
fn test_invalid_state_rejected_at_construction() {
    let result = WorldState::from_support(
        map(&[("A", "B"), ("B", "A"), ("C", "L1")]),
        three_floor_domain(),
        Goal::new(),
    );
    assert!(matches!(result, Err(PlanError::InvalidState(_))));
}
