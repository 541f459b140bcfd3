//! Roles granted to a pizza service user.
//!
//! A user holds a list of [`RoleGrant`]s. A franchisee grant names the
//! franchise it applies to through `objectId`. Role checks are plain
//! set-membership tests over that list.

use serde::{Deserialize, Serialize};

use crate::FranchiseId;

/// Kind of role a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Orders pizza. Every registered user is a diner.
    Diner,
    /// Runs the stores of one franchise.
    Franchisee,
    /// Manages franchises, stores, and users.
    Admin,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diner => write!(f, "diner"),
            Self::Franchisee => write!(f, "franchisee"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for RoleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diner" => Ok(Self::Diner),
            "franchisee" => Ok(Self::Franchisee),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// A single role held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrant {
    /// The kind of role.
    pub role: RoleKind,
    /// Franchise the role is scoped to (franchisee grants only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<FranchiseId>,
}

impl RoleGrant {
    /// An unscoped grant.
    #[must_use]
    pub const fn new(role: RoleKind) -> Self {
        Self {
            role,
            object_id: None,
        }
    }

    /// A franchisee grant for one franchise.
    #[must_use]
    pub const fn franchisee(franchise_id: FranchiseId) -> Self {
        Self {
            role: RoleKind::Franchisee,
            object_id: Some(franchise_id),
        }
    }
}

/// The role list of a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(Vec<RoleGrant>);

impl Roles {
    /// Wrap a list of grants.
    #[must_use]
    pub const fn new(grants: Vec<RoleGrant>) -> Self {
        Self(grants)
    }

    /// Whether any grant has the given kind.
    #[must_use]
    pub fn has(&self, kind: RoleKind) -> bool {
        self.0.iter().any(|grant| grant.role == kind)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has(RoleKind::Admin)
    }

    #[must_use]
    pub fn is_franchisee(&self) -> bool {
        self.has(RoleKind::Franchisee)
    }

    /// Whether the user is a franchisee of this specific franchise.
    #[must_use]
    pub fn is_franchisee_of(&self, franchise_id: FranchiseId) -> bool {
        self.0
            .iter()
            .any(|grant| grant.role == RoleKind::Franchisee && grant.object_id == Some(franchise_id))
    }

    /// Franchises the user holds a franchisee grant for.
    pub fn franchise_ids(&self) -> impl Iterator<Item = FranchiseId> + '_ {
        self.0
            .iter()
            .filter(|grant| grant.role == RoleKind::Franchisee)
            .filter_map(|grant| grant.object_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleGrant> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<RoleGrant>> for Roles {
    fn from(grants: Vec<RoleGrant>) -> Self {
        Self(grants)
    }
}
