//! Entity identity for the three voteable/reportable subjects.
//!
//! Votes, reports and flag scans all operate on an [`EntityRef`]: an entity
//! kind tag plus the entity's numeric id. The engine itself never loads
//! entities - existence and ownership are answered by the
//! [`EntityDirectory`](crate::application::ports::EntityDirectory) port.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::Error;

/// Numeric id of an entity row in the backing store.
pub type EntityId = u64;

/// Numeric id of a user account.
pub type UserId = u64;

/// The kind of subject a vote or report targets.
///
/// The set is closed: cars, build lists and global parts share one voting and
/// reporting engine rather than three copies of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityKind {
    /// A user-owned car profile.
    Car,
    /// A curated build list.
    BuildList,
    /// A part from the global catalog.
    Part,
}

impl EntityKind {
    /// All kinds, in scan order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Car, EntityKind::BuildList, EntityKind::Part];

    /// Stable wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Car => "car",
            EntityKind::BuildList => "build_list",
            EntityKind::Part => "part",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(EntityKind::Car),
            "build_list" => Ok(EntityKind::BuildList),
            "part" => Ok(EntityKind::Part),
            other => Err(Error::invalid_argument(format!(
                "unknown entity kind: {other:?}"
            ))),
        }
    }
}

/// A (kind, id) reference to a voteable/reportable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    /// The kind tag.
    pub kind: EntityKind,
    /// The entity's id within that kind.
    pub id: EntityId,
}

impl EntityRef {
    /// Create a reference from a kind and id.
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }

    /// Shorthand for a car reference.
    pub fn car(id: EntityId) -> Self {
        Self::new(EntityKind::Car, id)
    }

    /// Shorthand for a build list reference.
    pub fn build_list(id: EntityId) -> Self {
        Self::new(EntityKind::BuildList, id)
    }

    /// Shorthand for a global part reference.
    pub fn part(id: EntityId) -> Self {
        Self::new(EntityKind::Part, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "garage".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_display_format() {
        let entity = EntityRef::build_list(42);
        assert_eq!(entity.to_string(), "build_list/42");
    }

    #[test]
    fn test_refs_compare_by_kind_then_id() {
        assert_ne!(EntityRef::car(1), EntityRef::part(1));
        assert_eq!(EntityRef::car(1), EntityRef::new(EntityKind::Car, 1));
    }
}
