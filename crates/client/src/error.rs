//! Unified error handling for pizza service calls.
//!
//! Every fallible client operation returns [`Result<T>`]. Failures reported
//! by the service keep their HTTP status so the view layer can decide what
//! to show (a 401 means "log in again", a 409 means "email taken").

use reqwest::StatusCode;
use thiserror::Error;

use jwt_pizza_core::{EmailError, MenuItemId};

use crate::cart::CartError;
use crate::config::ConfigError;

/// Error type for the pizza client.
#[derive(Debug, Error)]
pub enum PizzaError {
    /// HTTP transport failed (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service error ({status}): {message}")]
    Api {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Message extracted from the response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The operation needs a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The menu has no item with this id.
    #[error("Not on the menu: {0}")]
    NotOnMenu(MenuItemId),

    /// The cart cannot be turned into an order.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Invalid email address input.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PizzaError {
    /// HTTP status reported by the service, if this is a service error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service rejected the credentials or token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the request conflicted with existing state (e.g. duplicate email).
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}

/// Result type alias for `PizzaError`.
pub type Result<T> = std::result::Result<T, PizzaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = PizzaError::Api {
            status: StatusCode::CONFLICT,
            message: "User already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Service error (409 Conflict): User already exists"
        );
        assert!(err.is_conflict());
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_status_only_for_api_errors() {
        assert_eq!(PizzaError::NotLoggedIn.status(), None);
        assert!(!PizzaError::NotLoggedIn.is_unauthorized());
    }

    #[test]
    fn test_cart_error_converts() {
        let err: PizzaError = CartError::Empty.into();
        assert_eq!(err.to_string(), "Cart error: no pizzas selected");
    }
}
