//! Franchises and their stores.

use serde::{Deserialize, Serialize};

use crate::{Bitcoin, Email, FranchiseId, StoreId, UserId};

/// A store belonging to a franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Only present on franchise dashboard responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<Bitcoin>,
}

/// A user listed as an administrator of a franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FranchiseAdmin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: Email,
}

/// A franchise and its ordered list of stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: FranchiseId,
    pub name: String,
    #[serde(default)]
    pub admins: Vec<FranchiseAdmin>,
    #[serde(default)]
    pub stores: Vec<Store>,
}

impl Franchise {
    /// Look up a store of this franchise.
    #[must_use]
    pub fn store(&self, store_id: StoreId) -> Option<&Store> {
        self.stores.iter().find(|store| store.id == store_id)
    }

    /// Sum of the revenue reported for each store.
    #[must_use]
    pub fn total_revenue(&self) -> Bitcoin {
        self.stores.iter().filter_map(|store| store.total_revenue).sum()
    }
}

/// One page of franchises.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FranchiseList {
    pub franchises: Vec<Franchise>,
    /// Whether another page follows.
    #[serde(default)]
    pub more: bool,
}
