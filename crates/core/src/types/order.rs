//! Orders and order history.
//!
//! An [`Order`] is assembled client-side from the cart and finalized by the
//! service, which assigns the id and the date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Bitcoin, FranchiseId, MenuItem, MenuItemId, OrderId, StoreId, UserId};

/// One pizza on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<MenuItemId>,
    /// Older history entries name this field `title`.
    #[serde(alias = "title")]
    pub description: String,
    pub price: Bitcoin,
}

impl From<&MenuItem> for OrderItem {
    fn from(item: &MenuItem) -> Self {
        Self {
            menu_id: Some(item.id),
            description: item.title.clone(),
            price: item.price,
        }
    }
}

/// An order, either pending submission or as recorded by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub franchise_id: Option<FranchiseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the item prices.
    #[must_use]
    pub fn total(&self) -> Bitcoin {
        self.items.iter().map(|item| item.price).sum()
    }
}

/// A page of a diner's past orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    #[serde(default)]
    pub diner_id: Option<UserId>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub page: u32,
}
