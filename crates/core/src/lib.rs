//! JWT Pizza Core - Shared domain types.
//!
//! This crate provides the types used across all JWT Pizza components:
//! - `client` - Session store, cart, and HTTP client for the pizza service
//! - `cli` - Terminal front end (`pizza`)
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Ids, emails, bitcoin amounts, roles, and the service's
//!   wire entities (users, menu items, franchises, orders)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
