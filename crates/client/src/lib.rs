//! JWT Pizza client library.
//!
//! Everything a pizza storefront front end needs besides rendering:
//! who is logged in, what they may see, what is in the cart, and how to
//! talk to the pizza service.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Unified error type for service calls
//! - [`service`] - HTTP client for the pizza service contract
//! - [`session`] - Current user and auth token, plus token persistence
//! - [`capability`] - Role-gated UI decisions
//! - [`cart`] - Pending order assembly
//! - [`storefront`] - Facade tying session, cart, and service together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod capability;
pub mod cart;
pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod storefront;

pub use capability::{Capability, CapabilitySet, NavItem};
pub use cart::{Cart, CartError, StoreTarget};
pub use config::{ClientConfig, ConfigError};
pub use error::{PizzaError, Result};
pub use service::{Endpoint, OrderReceipt, OrderVerification, PizzaService, ServiceDocs};
pub use session::{AuthToken, Session, TokenFile};
pub use storefront::Storefront;
