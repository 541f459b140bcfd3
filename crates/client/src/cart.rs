//! Pending order assembly.
//!
//! The cart is an ordered list of picked menu items plus the store the order
//! goes to. Every pick is one pizza, so picking the same item twice orders
//! two of them.

use thiserror::Error;

use jwt_pizza_core::{Bitcoin, FranchiseId, MenuItem, MenuItemId, Order, OrderItem, StoreId};

/// Reasons a cart cannot become an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("no pizzas selected")]
    Empty,
    #[error("no store selected")]
    NoStore,
}

/// Where the order will be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreTarget {
    pub franchise_id: FranchiseId,
    pub store_id: StoreId,
}

impl StoreTarget {
    #[must_use]
    pub const fn new(franchise_id: FranchiseId, store_id: StoreId) -> Self {
        Self {
            franchise_id,
            store_id,
        }
    }
}

impl std::str::FromStr for StoreTarget {
    type Err = String;

    /// Parse `franchise/store`, e.g. `2/4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (franchise, store) = s
            .split_once('/')
            .ok_or_else(|| format!("expected FRANCHISE/STORE, got {s:?}"))?;
        let franchise_id = franchise
            .parse::<FranchiseId>()
            .map_err(|e| format!("invalid franchise id {franchise:?}: {e}"))?;
        let store_id = store
            .parse::<StoreId>()
            .map_err(|e| format!("invalid store id {store:?}: {e}"))?;
        Ok(Self::new(franchise_id, store_id))
    }
}

/// The client-held, not-yet-submitted order.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    store: Option<StoreTarget>,
    items: Vec<MenuItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn select_store(&mut self, target: StoreTarget) {
        self.store = Some(target);
    }

    #[must_use]
    pub const fn store(&self) -> Option<StoreTarget> {
        self.store
    }

    /// Pick a pizza. Duplicates are kept.
    pub fn add(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Remove the pick at `index`. Out-of-range indexes are ignored.
    pub fn remove(&mut self, index: usize) -> Option<MenuItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove the first pick of the given menu item.
    pub fn remove_item(&mut self, id: MenuItemId) -> Option<MenuItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Drop every pick. The selected store is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the picked prices.
    #[must_use]
    pub fn total(&self) -> Bitcoin {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Build the order submission.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Empty` with nothing picked and
    /// `CartError::NoStore` without a store.
    pub fn to_order(&self) -> Result<Order, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let target = self.store.ok_or(CartError::NoStore)?;

        Ok(Order {
            id: None,
            franchise_id: Some(target.franchise_id),
            store_id: Some(target.store_id),
            date: None,
            items: self.items.iter().map(OrderItem::from).collect(),
        })
    }
}
