//! # Action Module
//!
//! An [`Action`] proposes relocating one clear object from the surface it
//! currently rests on to another surface. Actions are plain values: they
//! carry no behaviour of their own and are checked against a
//! [`WorldState`](crate::WorldState) only when applied.
//!
//! Plans are reported through the `Display` form
//! `move(<object>, <source>, <destination>)`, which downstream tooling
//! parses and must therefore stay stable.
//!
//! ```
//! use stackplan::Action;
//!
//! let action = Action::new("A", "B", "Floor2");
//! assert_eq!(action.to_string(), "move(A, B, Floor2)");
//! ```

use std::fmt;

/// A single proposed relocation of one object onto a new surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    /// The object being moved
    pub object: String,
    /// The surface the object rests on before the move
    pub source: String,
    /// The surface the object rests on after the move
    pub destination: String,
}

impl Action {
    /// Creates a new move of `object` from `source` to `destination`.
    pub fn new(
        object: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            object: object.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "move({}, {}, {})",
            self.object, self.source, self.destination
        )
    }
}
