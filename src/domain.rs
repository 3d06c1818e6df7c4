//! # Domain Configuration
//!
//! The static description of a blocks-and-floors world: which objects exist,
//! which floor locations exist, which locations can reach each other
//! directly, and which surfaces every object may be placed on.
//!
//! A [`Domain`] is validated once when it is built and is never mutated
//! afterwards. States share it through an `Arc`, so every state produced
//! during one search refers to the same instance.
//!
//! ```
//! use stackplan::Domain;
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
//! assert!(domain.is_adjacent("Floor1", "Floor2"));
//! assert!(domain.allows("A", "B"));
//! assert!(!domain.allows("B", "A"));
//! ```

use crate::{PlanError, Result};
use std::collections::{HashMap, HashSet};

/// Immutable world description shared by every state of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    objects: Vec<String>,
    locations: Vec<String>,
    adjacency: HashMap<String, HashSet<String>>,
    allowed_surfaces: HashMap<String, HashSet<String>>,
}

impl Domain {
    /// Creates a validated domain.
    ///
    /// Declaration order of `objects` and `locations` is kept and determines
    /// the order in which legal actions are enumerated.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedDomain`] when an identifier is declared
    /// twice, a name is both an object and a location, the adjacency relation
    /// mentions an undeclared location, or the permission table mentions an
    /// undeclared object or surface (or lets an object rest on itself).
    pub fn new(
        objects: Vec<String>,
        locations: Vec<String>,
        adjacency: HashMap<String, HashSet<String>>,
        allowed_surfaces: HashMap<String, HashSet<String>>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in objects.iter().chain(locations.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(PlanError::MalformedDomain(format!(
                    "identifier `{}` is declared more than once",
                    name
                )));
            }
        }

        let domain = Self {
            objects,
            locations,
            adjacency,
            allowed_surfaces,
        };

        for (from, targets) in &domain.adjacency {
            if !domain.is_location(from) {
                return Err(PlanError::MalformedDomain(format!(
                    "adjacency references unknown location `{}`",
                    from
                )));
            }
            if let Some(to) = targets.iter().find(|t| !domain.is_location(t)) {
                return Err(PlanError::MalformedDomain(format!(
                    "adjacency of `{}` references unknown location `{}`",
                    from, to
                )));
            }
        }

        for (object, surfaces) in &domain.allowed_surfaces {
            if !domain.is_object(object) {
                return Err(PlanError::MalformedDomain(format!(
                    "permissions declared for unknown object `{}`",
                    object
                )));
            }
            for surface in surfaces {
                if surface == object {
                    return Err(PlanError::MalformedDomain(format!(
                        "object `{}` may not rest on itself",
                        object
                    )));
                }
                if !domain.is_surface(surface) {
                    return Err(PlanError::MalformedDomain(format!(
                        "object `{}` is allowed on unknown surface `{}`",
                        object, surface
                    )));
                }
            }
        }

        Ok(domain)
    }

    /// Starts a [`DomainBuilder`].
    pub fn builder() -> DomainBuilder {
        DomainBuilder::default()
    }

    /// Objects in declaration order.
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    /// Floor locations in declaration order.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Every surface: objects first, then locations.
    pub fn surfaces(&self) -> impl Iterator<Item = &String> {
        self.objects.iter().chain(self.locations.iter())
    }

    pub fn is_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o == name)
    }

    pub fn is_location(&self, name: &str) -> bool {
        self.locations.iter().any(|l| l == name)
    }

    pub fn is_surface(&self, name: &str) -> bool {
        self.is_object(name) || self.is_location(name)
    }

    /// Locations directly reachable from `location`.
    pub fn neighbors(&self, location: &str) -> impl Iterator<Item = &String> {
        self.adjacency.get(location).into_iter().flatten()
    }

    /// Whether an object may move from `from` to `to`.
    ///
    /// Moves within one location are always permitted; otherwise the
    /// directed adjacency relation must contain `from -> to`.
    pub fn is_adjacent(&self, from: &str, to: &str) -> bool {
        from == to
            || self
                .adjacency
                .get(from)
                .map_or(false, |targets| targets.contains(to))
    }

    /// Whether `object` may be placed on `surface`.
    pub fn allows(&self, object: &str, surface: &str) -> bool {
        self.allowed_surfaces
            .get(object)
            .map_or(false, |surfaces| surfaces.contains(surface))
    }
}

/// Fluent construction of a [`Domain`], validated by [`DomainBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct DomainBuilder {
    objects: Vec<String>,
    locations: Vec<String>,
    adjacency: HashMap<String, HashSet<String>>,
    allowed_surfaces: HashMap<String, HashSet<String>>,
}

impl DomainBuilder {
    pub fn object(mut self, name: impl Into<String>) -> Self {
        self.objects.push(name.into());
        self
    }

    pub fn objects<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn location(mut self, name: impl Into<String>) -> Self {
        self.locations.push(name.into());
        self
    }

    pub fn locations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds the one-way link `from -> to`.
    pub fn adjacent(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.adjacency
            .entry(from.into())
            .or_default()
            .insert(to.into());
        self
    }

    /// Adds links in both directions between `a` and `b`.
    pub fn connect(self, a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        self.adjacent(a.clone(), b.clone()).adjacent(b, a)
    }

    /// Permits `object` to rest on each of `surfaces`.
    pub fn allow<I, S>(mut self, object: impl Into<String>, surfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_surfaces
            .entry(object.into())
            .or_default()
            .extend(surfaces.into_iter().map(Into::into));
        self
    }

    /// Validates and returns the domain.
    ///
    /// # Errors
    ///
    /// See [`Domain::new`].
    pub fn build(self) -> Result<Domain> {
        Domain::new(
            self.objects,
            self.locations,
            self.adjacency,
            self.allowed_surfaces,
        )
    }
}
