//! Command implementations.
//!
//! Each command restores nothing itself: `main` hands it a storefront whose
//! session was already resumed from the token file.

pub mod account;
pub mod admin;
pub mod franchise;
pub mod order;

use jwt_pizza_client::{Capability, PizzaError, Storefront};
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The pizza client failed.
    #[error(transparent)]
    Pizza(#[from] PizzaError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// The command belongs to a section the current user is not shown.
    #[error("{0} is not available for this account")]
    NotAvailable(&'static str),
}

/// Refuse a command whose UI section would be hidden for this user.
///
/// The service would reject the call anyway; this just keeps the terminal
/// consistent with what the browser shows.
pub fn require(
    storefront: &Storefront,
    capability: Capability,
    section: &'static str,
) -> Result<(), CliError> {
    if !storefront.session().is_logged_in() {
        return Err(PizzaError::NotLoggedIn.into());
    }
    if storefront.capabilities().allows(capability) {
        Ok(())
    } else {
        Err(CliError::NotAvailable(section))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jwt_pizza_client::{AuthToken, ClientConfig, PizzaService, Session};
    use jwt_pizza_core::{Email, FranchiseId, RoleGrant, RoleKind, Roles, StoreId, User, UserId};

    use super::*;

    // Nothing listens on the discard port; every case here fails before a request.
    fn offline() -> Storefront {
        let config = ClientConfig::for_service("http://127.0.0.1:9").unwrap();
        Storefront::new(PizzaService::new(&config).unwrap())
    }

    fn as_user(id: i64, email: &str, grant: RoleGrant) -> Storefront {
        let mut session = Session::new();
        session.establish(
            User {
                id: UserId::new(id),
                name: "Pat Doe".to_string(),
                email: Email::parse(email).unwrap(),
                roles: Roles::new(vec![grant]),
            },
            AuthToken::new("abcdef"),
        );
        offline().with_session(session)
    }

    fn diner() -> Storefront {
        as_user(3, "d@jwt.com", RoleGrant::new(RoleKind::Diner))
    }

    fn franchisee() -> Storefront {
        as_user(4, "f@jwt.com", RoleGrant::franchisee(FranchiseId::new(2)))
    }

    #[tokio::test]
    async fn test_diner_cannot_use_admin_dashboard() {
        let mut out = Vec::new();
        let err = admin::users(&diner(), &mut out, "", 0).await.unwrap_err();
        assert!(matches!(err, CliError::NotAvailable(_)));
        assert_eq!(err.to_string(), "The admin dashboard is not available for this account");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_franchisee_limited_to_own_franchise() {
        let mut out = Vec::new();
        let err = franchise::create_store(&franchisee(), &mut out, FranchiseId::new(3), "Provo")
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::NotAvailable("Creating stores")));

        let err = franchise::close_store(&franchisee(), &mut out, FranchiseId::new(3), StoreId::new(7))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::NotAvailable("Closing stores")));
    }

    #[tokio::test]
    async fn test_logged_out_user_is_asked_to_log_in() {
        let mut out = Vec::new();
        let err = admin::delete_user(&offline(), &mut out, UserId::new(3))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Pizza(PizzaError::NotLoggedIn)));

        let err = franchise::list(&offline(), &mut out).await.unwrap_err();
        assert!(matches!(err, CliError::Pizza(PizzaError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_franchise_pitch_for_diners() {
        let mut out = Vec::new();
        franchise::list(&diner(), &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("So you want a piece of the pie?"));
    }

    #[test]
    fn test_gate_passes_matching_role() {
        assert!(require(&franchisee(), Capability::ManageStores(FranchiseId::new(2)), "x").is_ok());
        assert!(require(&franchisee(), Capability::FranchiseDashboard, "x").is_ok());
        assert!(require(&diner(), Capability::PlaceOrder, "x").is_ok());
    }
}
