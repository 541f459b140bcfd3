//! Core types for JWT Pizza.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the entities exchanged with the pizza service.

pub mod bitcoin;
pub mod email;
pub mod franchise;
pub mod id;
pub mod menu;
pub mod order;
pub mod role;
pub mod user;

pub use bitcoin::Bitcoin;
pub use email::{Email, EmailError};
pub use franchise::{Franchise, FranchiseAdmin, FranchiseList, Store};
pub use id::*;
pub use menu::MenuItem;
pub use order::{Order, OrderHistory, OrderItem};
pub use role::{RoleGrant, RoleKind, Roles};
pub use user::{User, UserList};
