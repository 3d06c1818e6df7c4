//! # World State
//!
//! A [`WorldState`] is an immutable snapshot of a blocks-and-floors world:
//! which surface every object rests on (`support`) and which surfaces have
//! nothing resting on them (`clear`). Each state also carries the shared
//! [`Domain`] and the goal it is being planned towards.
//!
//! States are values. Applying an [`Action`] never mutates the receiver;
//! it produces a fresh state, or nothing when the action is inconsistent
//! with the snapshot.
//!
//! ## Equality
//!
//! Two states are equal when their `support` and `clear` tables hold the
//! same entries. The goal and the domain are not part of equality, so the
//! same physical arrangement planned towards two different goals
//! deduplicates to one state. Hashing follows the same rule and does not
//! depend on the internal iteration order of either table.
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use stackplan::{Domain, WorldState};
//!
//! let domain = Arc::new(
//!     Domain::builder()
//!         .objects(["A", "B"])
//!         .locations(["Floor1", "Floor2"])
//!         .connect("Floor1", "Floor2")
//!         .allow("A", ["B", "Floor1", "Floor2"])
//!         .allow("B", ["Floor1", "Floor2"])
//!         .build()
//!         .unwrap(),
//! );
//!
//! let support = HashMap::from([
//!     ("A".to_string(), "B".to_string()),
//!     ("B".to_string(), "Floor1".to_string()),
//! ]);
//! let goal = HashMap::from([("A".to_string(), "Floor2".to_string())]);
//!
//! let state = WorldState::from_support(support, domain, goal).unwrap();
//! assert!(state.is_clear("A"));
//! assert!(!state.is_clear("B"));
//! assert!(!state.is_goal());
//!
//! let moves: Vec<String> = state
//!     .legal_actions()
//!     .unwrap()
//!     .iter()
//!     .map(|a| a.to_string())
//!     .collect();
//! assert_eq!(moves, ["move(A, B, Floor2)"]);
//! ```

use crate::{Action, Domain, PlanError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Required surface for each constrained object. Objects without an entry
/// may end up anywhere.
pub type Goal = HashMap<String, String>;

/// Immutable snapshot of what rests on what.
#[derive(Clone)]
pub struct WorldState {
    support: HashMap<String, String>,
    clear: HashMap<String, bool>,
    domain: Arc<Domain>,
    goal: Arc<Goal>,
}

impl WorldState {
    /// Creates a validated state from explicit `support` and `clear` tables.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidState`] if an object is missing from
    /// `support`, a table references an unknown surface, the support relation
    /// contains a cycle, `clear` misses an entry, a `clear` flag disagrees
    /// with `support`, or the goal references unknown names.
    pub fn new(
        support: HashMap<String, String>,
        clear: HashMap<String, bool>,
        domain: Arc<Domain>,
        goal: Goal,
    ) -> Result<Self> {
        let state = Self {
            support,
            clear,
            domain,
            goal: Arc::new(goal),
        };
        state.validate()?;
        Ok(state)
    }

    /// Creates a validated state, deriving every `clear` flag from `support`.
    ///
    /// # Errors
    ///
    /// Same as [`WorldState::new`], except that `clear` can no longer
    /// disagree with `support`.
    pub fn from_support(
        support: HashMap<String, String>,
        domain: Arc<Domain>,
        goal: Goal,
    ) -> Result<Self> {
        let occupied: HashSet<&str> = support.values().map(String::as_str).collect();
        let clear = domain
            .surfaces()
            .map(|s| (s.clone(), !occupied.contains(s.as_str())))
            .collect();
        Self::new(support, clear, domain, goal)
    }

    /// Returns the same physical arrangement planned towards another goal.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidState`] if the goal references unknown
    /// names.
    pub fn with_goal(&self, goal: Goal) -> Result<Self> {
        let state = Self {
            support: self.support.clone(),
            clear: self.clear.clone(),
            domain: Arc::clone(&self.domain),
            goal: Arc::new(goal),
        };
        state.validate_goal()?;
        Ok(state)
    }

    fn validate(&self) -> Result<()> {
        let domain = &self.domain;

        for object in domain.objects() {
            let surface = self.support.get(object).ok_or_else(|| {
                PlanError::InvalidState(format!("object `{}` has no support entry", object))
            })?;
            if surface == object {
                return Err(PlanError::InvalidState(format!(
                    "object `{}` rests on itself",
                    object
                )));
            }
        }
        for (object, surface) in &self.support {
            if !domain.is_object(object) {
                return Err(PlanError::InvalidState(format!(
                    "support entry for unknown object `{}`",
                    object
                )));
            }
            if !domain.is_surface(surface) {
                return Err(PlanError::InvalidState(format!(
                    "object `{}` rests on unknown surface `{}`",
                    object, surface
                )));
            }
        }

        for object in domain.objects() {
            if self.underlying_location(object).is_err() {
                return Err(PlanError::InvalidState(format!(
                    "object `{}` is part of a support cycle",
                    object
                )));
            }
        }

        for surface in domain.surfaces() {
            let flag = self.clear.get(surface).ok_or_else(|| {
                PlanError::InvalidState(format!("surface `{}` has no clear entry", surface))
            })?;
            let occupied = self.support.values().any(|s| s == surface);
            if *flag == occupied {
                return Err(PlanError::InvalidState(format!(
                    "clear flag of `{}` is {} but it {} occupied",
                    surface,
                    flag,
                    if occupied { "is" } else { "is not" }
                )));
            }
        }
        if let Some(unknown) = self.clear.keys().find(|k| !domain.is_surface(k)) {
            return Err(PlanError::InvalidState(format!(
                "clear entry for unknown surface `{}`",
                unknown
            )));
        }

        self.validate_goal()
    }

    fn validate_goal(&self) -> Result<()> {
        for (object, surface) in self.goal.iter() {
            if !self.domain.is_object(object) {
                return Err(PlanError::InvalidState(format!(
                    "goal references unknown object `{}`",
                    object
                )));
            }
            if !self.domain.is_surface(surface) {
                return Err(PlanError::InvalidState(format!(
                    "goal places `{}` on unknown surface `{}`",
                    object, surface
                )));
            }
        }
        Ok(())
    }

    pub fn domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn support(&self) -> &HashMap<String, String> {
        &self.support
    }

    pub fn clear(&self) -> &HashMap<String, bool> {
        &self.clear
    }

    /// The surface `object` currently rests on.
    pub fn support_of(&self, object: &str) -> Option<&str> {
        self.support.get(object).map(String::as_str)
    }

    /// Whether nothing rests on `surface`. Unknown surfaces are never clear.
    pub fn is_clear(&self, surface: &str) -> bool {
        self.clear.get(surface).copied().unwrap_or(false)
    }

    /// True when every goal entry holds. Objects absent from the goal are
    /// unconstrained.
    pub fn is_goal(&self) -> bool {
        self.goal_mismatches() == 0
    }

    /// Number of goal entries whose object does not rest on the required
    /// surface.
    pub fn goal_mismatches(&self) -> usize {
        self.goal
            .iter()
            .filter(|(object, surface)| self.support_of(object) != Some(surface.as_str()))
            .count()
    }

    /// Follows `support` down from `surface` until a location is reached.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if no location is reached within
    /// `|objects| + 1` steps or an object on the way has no support.
    pub fn underlying_location<'a>(&'a self, surface: &'a str) -> Result<&'a str> {
        let mut current = surface;
        for _ in 0..=self.domain.objects().len() {
            if self.domain.is_location(current) {
                return Ok(current);
            }
            current = self.support_of(current).ok_or_else(|| {
                PlanError::MalformedState(format!("surface `{}` has no support", current))
            })?;
        }
        Err(PlanError::MalformedState(format!(
            "no location found under `{}`; the support relation has a cycle",
            surface
        )))
    }

    fn resting_on(&self, object: &str) -> Result<&str> {
        self.support_of(object).ok_or_else(|| {
            PlanError::MalformedState(format!("object `{}` has no support", object))
        })
    }

    /// Enumerates every legal move in this state.
    ///
    /// For each clear object, in domain order, moves onto clear permitted
    /// locations are listed first, followed by moves onto clear permitted
    /// objects. A destination qualifies only if its underlying location is
    /// the same as, or adjacent to, the location under the moving object.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if location resolution fails.
    pub fn legal_actions(&self) -> Result<Vec<Action>> {
        let domain = &self.domain;
        let mut actions = Vec::new();

        for object in domain.objects() {
            if !self.is_clear(object) {
                continue;
            }
            let from = self.resting_on(object)?;
            let from_location = self.underlying_location(from)?;

            for floor in domain.locations() {
                if floor != from
                    && self.is_clear(floor)
                    && domain.allows(object, floor)
                    && domain.is_adjacent(from_location, floor)
                {
                    actions.push(Action::new(object.as_str(), from, floor.as_str()));
                }
            }

            for target in domain.objects() {
                if target == object || !self.is_clear(target) || !domain.allows(object, target) {
                    continue;
                }
                if domain.is_adjacent(from_location, self.underlying_location(target)?) {
                    actions.push(Action::new(object.as_str(), from, target.as_str()));
                }
            }
        }

        Ok(actions)
    }

    /// Applies `action`, returning the resulting state.
    ///
    /// Returns `Ok(None)` when the action is inconsistent with this state:
    /// the object is unknown or not clear, it does not rest on the claimed
    /// source, the destination is unknown, occupied or not permitted, or the
    /// two positions are not adjacent. The receiver is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if location resolution fails.
    pub fn apply(&self, action: &Action) -> Result<Option<WorldState>> {
        let domain = &self.domain;
        let (object, source, destination) = (
            action.object.as_str(),
            action.source.as_str(),
            action.destination.as_str(),
        );

        if self.support_of(object) != Some(source) || !self.is_clear(object) {
            return Ok(None);
        }
        if destination == object
            || !domain.is_surface(destination)
            || !self.is_clear(destination)
            || !domain.allows(object, destination)
        {
            return Ok(None);
        }
        let from_location = self.underlying_location(source)?;
        let to_location = self.underlying_location(destination)?;
        if !domain.is_adjacent(from_location, to_location) {
            return Ok(None);
        }

        let mut support = self.support.clone();
        support.insert(object.to_string(), destination.to_string());
        let source_clear = !support.values().any(|s| s == source);

        let mut clear = self.clear.clone();
        clear.insert(object.to_string(), true);
        clear.insert(destination.to_string(), false);
        clear.insert(source.to_string(), source_clear);

        Ok(Some(Self {
            support,
            clear,
            domain: Arc::clone(&self.domain),
            goal: Arc::clone(&self.goal),
        }))
    }

    /// Every legal action paired with the state it leads to.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedState`] if location resolution fails.
    pub fn successors(&self) -> Result<Vec<(Action, WorldState)>> {
        let mut successors = Vec::new();
        for action in self.legal_actions()? {
            match self.apply(&action)? {
                Some(next) => successors.push((action, next)),
                None => log::warn!("generated action {} was rejected on apply", action),
            }
        }
        Ok(successors)
    }
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.support == other.support && self.clear == other.clear
    }
}

impl Eq for WorldState {}

impl Hash for WorldState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut support: Vec<_> = self.support.iter().collect();
        support.sort();
        for (object, surface) in support {
            object.hash(state);
            surface.hash(state);
        }

        let mut clear: Vec<_> = self.clear.iter().collect();
        clear.sort();
        for (surface, flag) in clear {
            surface.hash(state);
            flag.hash(state);
        }
    }
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut support: Vec<_> = self.support.iter().collect();
        support.sort();
        let mut clear: Vec<_> = self
            .clear
            .iter()
            .filter(|(_, c)| **c)
            .map(|(s, _)| s)
            .collect();
        clear.sort();
        f.debug_struct("WorldState")
            .field("support", &support)
            .field("clear", &clear)
            .finish()
    }
}
