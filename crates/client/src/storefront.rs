//! Storefront facade.
//!
//! Ties the session, the cart, and the service together so the view layer
//! only has to call one method per user action. Each method keeps the
//! session in sync with what the service answered.
//!
//! # Example
//!
//! ```rust,ignore
//! use jwt_pizza_client::{ClientConfig, Storefront, StoreTarget};
//!
//! let mut storefront = Storefront::from_config(&ClientConfig::from_env()?)?;
//! storefront.login("d@jwt.com", &password).await?;
//!
//! storefront.cart_mut().select_store("2/4".parse()?);
//! storefront.add_to_cart(MenuItemId::new(1)).await?;
//! let receipt = storefront.checkout().await?;
//! ```

use secrecy::SecretString;
use tracing::{info, instrument, warn};

use jwt_pizza_core::{
    Email, Franchise, FranchiseId, FranchiseList, MenuItem, MenuItemId, OrderHistory, Store,
    StoreId, User, UserId, UserList,
};

use crate::capability::{self, CapabilitySet, NavItem};
use crate::cart::Cart;
use crate::config::ClientConfig;
use crate::error::{PizzaError, Result};
use crate::service::{AuthResponse, OrderReceipt, OrderVerification, PizzaService};
use crate::session::{AuthToken, Session, TokenFile};

/// Page size used by the dashboards.
pub const PAGE_SIZE: u32 = 10;

/// A storefront user's client-side state.
#[derive(Debug)]
pub struct Storefront {
    service: PizzaService,
    session: Session,
    cart: Cart,
    token_file: Option<TokenFile>,
}

impl Storefront {
    /// Logged out, empty cart, nothing persisted.
    #[must_use]
    pub fn new(service: PizzaService) -> Self {
        Self {
            service,
            session: Session::new(),
            cart: Cart::new(),
            token_file: None,
        }
    }

    /// Build the service from configuration and persist the token to the
    /// configured session file, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut storefront = Self::new(PizzaService::new(config)?);
        storefront.token_file = config.session_file.clone().map(TokenFile::new);
        Ok(storefront)
    }

    /// Persist the token to this file from now on.
    #[must_use]
    pub fn with_token_file(mut self, token_file: TokenFile) -> Self {
        self.token_file = Some(token_file);
        self
    }

    /// Start from a session the caller already holds.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub const fn service(&self) -> &PizzaService {
        &self.service
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// What the UI may offer the current user.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        capability::capabilities(&self.session)
    }

    /// Header and footer links for the current user.
    #[must_use]
    pub fn navigation(&self) -> Vec<NavItem> {
        capability::navigation(&self.session)
    }

    fn require_login(&self) -> Result<(AuthToken, &User)> {
        match (self.session.token(), self.session.user()) {
            (Some(token), Some(user)) => Ok((token.clone(), user)),
            _ => Err(PizzaError::NotLoggedIn),
        }
    }

    fn persist(&self, token: &AuthToken) -> Result<()> {
        if let Some(file) = &self.token_file {
            file.save(token)?;
        }
        Ok(())
    }

    fn forget(&self) -> Result<()> {
        if let Some(file) = &self.token_file {
            file.remove()?;
        }
        Ok(())
    }

    fn adopt(&mut self, response: AuthResponse) -> Result<&User> {
        let token = AuthToken::new(response.token);
        self.persist(&token)?;
        self.session.establish(response.user, token);
        self.session.user().ok_or(PizzaError::NotLoggedIn)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Resume the session persisted in the token file, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the service cannot be
    /// reached.
    pub async fn restore(&mut self) -> Result<Option<&User>> {
        let token = match &self.token_file {
            Some(file) => file.load()?,
            None => None,
        };

        match token {
            Some(token) => self.restore_token(token).await,
            None => Ok(None),
        }
    }

    /// Resume a session from a previously issued token.
    ///
    /// The service decides who the token belongs to. An empty answer or a
    /// 401 means the token is dead: the session is cleared and the stored
    /// token is forgotten.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached. The session is left
    /// logged out but the stored token is kept for the next attempt.
    #[instrument(skip_all)]
    pub async fn restore_token(&mut self, token: AuthToken) -> Result<Option<&User>> {
        self.session.adopt_token(token.clone());

        match self.service.current_user(&token).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Session restored");
                self.session.establish(user, token);
                Ok(self.session.user())
            }
            Ok(None) => {
                self.session.clear();
                self.forget()?;
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => {
                info!("Stored session expired");
                self.session.clear();
                self.forget()?;
                Ok(None)
            }
            Err(e) => {
                self.session.clear();
                Err(e)
            }
        }
    }

    /// Log in and start a session.
    ///
    /// # Errors
    ///
    /// `PizzaError::Email` for malformed input, a 401 `PizzaError::Api` for
    /// bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<&User> {
        let email = Email::parse_input(email)?;
        let response = self.service.login(&email, password).await?;
        info!(user_id = %response.user.id, "Logged in");
        self.adopt(response)
    }

    /// Register a diner and start a session.
    ///
    /// # Errors
    ///
    /// `PizzaError::Email` for malformed input, a 409 `PizzaError::Api` if the
    /// email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<&User> {
        let email = Email::parse_input(email)?;
        let response = self.service.register(name.trim(), &email, password).await?;
        info!(user_id = %response.user.id, "Registered");
        self.adopt(response)
    }

    /// End the session.
    ///
    /// Local state is cleared first, so a failed server call still leaves the
    /// client logged out. The failure is then reported.
    ///
    /// # Errors
    ///
    /// Returns the service error if the server call fails, otherwise the
    /// storage error if the stored token cannot be removed. The server call
    /// is made either way.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<()> {
        let token = self.session.token().cloned();
        self.session.clear();
        let forgotten = self.forget();
        if let Err(e) = &forgotten {
            warn!(error = %e, "Could not remove the stored token");
        }

        if let Some(token) = token {
            if let Err(e) = self.service.logout(&token).await {
                warn!(error = %e, "Logout failed on the service; local session cleared anyway");
                return Err(e);
            }
            info!("Logged out");
        }
        forgotten
    }

    /// Update the current user's profile. Leave `password` empty to keep it.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session, otherwise whatever the
    /// service answers.
    #[instrument(skip(self, password))]
    pub async fn update_profile(
        &mut self,
        name: &str,
        email: &str,
        password: Option<&SecretString>,
    ) -> Result<&User> {
        let (token, user) = self.require_login()?;
        let user_id = user.id;
        let email = Email::parse_input(email)?;

        let response = self
            .service
            .update_user(&token, user_id, name.trim(), &email, password)
            .await?;

        let token = AuthToken::new(response.token);
        self.persist(&token)?;
        self.session.update_user(response.user, token);
        self.session.user().ok_or(PizzaError::NotLoggedIn)
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// The menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be fetched.
    pub async fn menu(&self) -> Result<Vec<MenuItem>> {
        Ok(self.service.menu().await?.as_ref().clone())
    }

    /// Pick a pizza from the menu into the cart.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotOnMenu` if no menu item has this id.
    pub async fn add_to_cart(&mut self, id: MenuItemId) -> Result<&MenuItem> {
        let menu = self.service.menu().await?;
        let item = menu
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(PizzaError::NotOnMenu(id))?;

        self.cart.add(item);
        self.cart.items().last().ok_or(PizzaError::NotOnMenu(id))
    }

    /// Franchises and stores to order from, filtered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn franchises(&self, filter: &str, page: u32) -> Result<FranchiseList> {
        self.service
            .list_franchises(self.session.token(), page, PAGE_SIZE, filter)
            .await
    }

    /// Submit the cart as an order.
    ///
    /// The cart is emptied only once the service accepts the order, so a
    /// failure leaves it intact for a retry.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session, `PizzaError::Cart` when
    /// the cart is empty or has no store, otherwise whatever the service
    /// answers.
    #[instrument(skip(self), fields(items = self.cart.len()))]
    pub async fn checkout(&mut self) -> Result<OrderReceipt> {
        let (token, _) = self.require_login()?;
        let order = self.cart.to_order()?;

        let receipt = self.service.place_order(&token, &order).await?;
        info!(
            order_id = ?receipt.order.id,
            total = %order.total(),
            "Order placed"
        );
        self.cart.clear();
        Ok(receipt)
    }

    /// Check a receipt's settlement token with the pizza factory.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session, otherwise whatever the
    /// factory answers.
    pub async fn verify(&self, jwt: &str) -> Result<OrderVerification> {
        let (token, _) = self.require_login()?;
        self.service.verify_order(&token, jwt).await
    }

    /// A page of the current diner's past orders.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn order_history(&self, page: u32) -> Result<OrderHistory> {
        let (token, _) = self.require_login()?;
        self.service.order_history(&token, page).await
    }

    // =========================================================================
    // Franchise dashboard
    // =========================================================================

    /// Franchises the current user runs.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn my_franchises(&self) -> Result<Vec<Franchise>> {
        let (token, user) = self.require_login()?;
        self.service.user_franchises(&token, user.id).await
    }

    /// Open a store.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session, otherwise whatever the
    /// service answers.
    pub async fn create_store(&self, franchise_id: FranchiseId, name: &str) -> Result<Store> {
        let (token, _) = self.require_login()?;
        self.service
            .create_store(&token, franchise_id, name.trim())
            .await
    }

    /// Close a store.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session, otherwise whatever the
    /// service answers.
    pub async fn close_store(&self, franchise_id: FranchiseId, store_id: StoreId) -> Result<()> {
        let (token, _) = self.require_login()?;
        self.service.close_store(&token, franchise_id, store_id).await
    }

    // =========================================================================
    // Admin dashboard
    // =========================================================================

    /// Create a franchise run by the given users.
    ///
    /// # Errors
    ///
    /// `PizzaError::Email` if an admin email is malformed,
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn create_franchise(&self, name: &str, admin_emails: &[&str]) -> Result<Franchise> {
        let (token, _) = self.require_login()?;
        let admins = admin_emails
            .iter()
            .map(|email| Email::parse_input(email))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.service
            .create_franchise(&token, name.trim(), &admins)
            .await
    }

    /// Close a franchise.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn close_franchise(&self, franchise_id: FranchiseId) -> Result<()> {
        let (token, _) = self.require_login()?;
        self.service.close_franchise(&token, franchise_id).await
    }

    /// A page of users, filtered by name.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn list_users(&self, filter: &str, page: u32) -> Result<UserList> {
        let (token, _) = self.require_login()?;
        self.service
            .list_users(&token, page, PAGE_SIZE, filter)
            .await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// `PizzaError::NotLoggedIn` without a session.
    pub async fn delete_user(&self, user_id: UserId) -> Result<()> {
        let (token, _) = self.require_login()?;
        self.service.delete_user(&token, user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jwt_pizza_core::{Bitcoin, RoleGrant, RoleKind, Roles};

    use super::*;
    use crate::cart::{CartError, StoreTarget};

    // Port 9 is discard; nothing answers, and these tests never get that far.
    fn offline() -> Storefront {
        let config = ClientConfig::for_service("http://127.0.0.1:9").unwrap();
        Storefront::new(PizzaService::new(&config).unwrap())
    }

    fn logged_in() -> Storefront {
        let mut session = Session::new();
        session.establish(
            User {
                id: UserId::new(3),
                name: "Kai Chen".to_string(),
                email: Email::parse("d@jwt.com").unwrap(),
                roles: Roles::new(vec![RoleGrant::new(RoleKind::Diner)]),
            },
            AuthToken::new("abcdef"),
        );
        offline().with_session(session)
    }

    fn veggie() -> MenuItem {
        MenuItem {
            id: MenuItemId::new(1),
            title: "Veggie".to_string(),
            image: "pizza1.png".to_string(),
            price: Bitcoin::from_parts(38, 4),
            description: "A garden of delight".to_string(),
        }
    }

    #[tokio::test]
    async fn test_checkout_requires_login() {
        let mut storefront = offline();
        storefront.cart_mut().add(veggie());
        let err = storefront.checkout().await.unwrap_err();
        assert!(matches!(err, PizzaError::NotLoggedIn));
        assert_eq!(storefront.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_rejects_incomplete_cart_before_calling_service() {
        let mut storefront = logged_in();
        let err = storefront.checkout().await.unwrap_err();
        assert!(matches!(err, PizzaError::Cart(CartError::Empty)));

        storefront.cart_mut().add(veggie());
        let err = storefront.checkout().await.unwrap_err();
        assert!(matches!(err, PizzaError::Cart(CartError::NoStore)));
    }

    #[tokio::test]
    async fn test_dashboard_calls_require_login() {
        let storefront = offline();
        assert!(matches!(
            storefront.my_franchises().await.unwrap_err(),
            PizzaError::NotLoggedIn
        ));
        assert!(matches!(
            storefront.list_users("", 0).await.unwrap_err(),
            PizzaError::NotLoggedIn
        ));
        assert!(matches!(
            storefront.order_history(0).await.unwrap_err(),
            PizzaError::NotLoggedIn
        ));
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email_locally() {
        let mut storefront = offline();
        let err = storefront
            .login("not-an-email", &SecretString::from("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, PizzaError::Email(_)));
        assert!(!storefront.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_create_franchise_validates_admin_emails() {
        let storefront = logged_in();
        let err = storefront
            .create_franchise("PizzaCorp", &["f@jwt.com", "@nope"])
            .await
            .unwrap_err();
        assert!(matches!(err, PizzaError::Email(_)));
    }

    #[tokio::test]
    async fn test_logout_without_session_is_a_no_op() {
        let mut storefront = offline();
        storefront.logout().await.unwrap();
        assert!(!storefront.session().is_logged_in());
    }

    #[test]
    fn test_navigation_follows_session() {
        let storefront = logged_in();
        let labels: Vec<String> = storefront
            .navigation()
            .iter()
            .map(|item| item.label().to_string())
            .collect();
        assert_eq!(labels, ["Order", "Franchise", "Logout", "KC"]);
    }

    #[test]
    fn test_selected_store_is_kept() {
        let mut storefront = logged_in();
        storefront
            .cart_mut()
            .select_store(StoreTarget::new(FranchiseId::new(2), StoreId::new(4)));
        assert_eq!(storefront.cart().store().unwrap().store_id, StoreId::new(4));
    }
}
