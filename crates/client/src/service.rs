//! HTTP client for the pizza service.
//!
//! One async method per endpoint of the service contract. The client is a
//! pass-through: it attaches the bearer token, maps non-success statuses to
//! [`PizzaError::Api`], and deserializes the body. The menu is cached
//! using `moka` because every order page asks for it.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use jwt_pizza_core::{
    Email, Franchise, FranchiseId, FranchiseList, MenuItem, Order, OrderHistory, Store, StoreId,
    User, UserId, UserList,
};

use crate::config::ClientConfig;
use crate::error::{PizzaError, Result};
use crate::session::AuthToken;

const MENU_CACHE_KEY: &str = "menu";
const ERROR_BODY_PREVIEW: usize = 200;

// =============================================================================
// Wire types
// =============================================================================

/// Response to login, registration, and profile updates.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// A placed order and its settlement token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order: Order,
    /// Signed by the pizza factory. Verify with [`PizzaService::verify_order`].
    pub jwt: String,
}

impl OrderReceipt {
    /// Decode the claims segment of the settlement token for display.
    ///
    /// The signature is not checked. Returns `None` if the token is not a
    /// three-part JWT with a JSON payload.
    #[must_use]
    pub fn claims(&self) -> Option<Value> {
        let mut parts = self.jwt.split('.');
        let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// The pizza factory's verdict on a settlement token.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderVerification {
    pub message: String,
    #[serde(default)]
    pub payload: Value,
}

/// One documented endpoint of the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requires_auth: bool,
}

/// Service self-description from `/api/docs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDocs {
    pub version: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub config: Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Wrap a user-typed filter in the service's wildcard syntax.
fn wildcard(filter: &str) -> String {
    let filter = filter.trim().trim_matches('*');
    if filter.is_empty() {
        "*".to_string()
    } else {
        format!("*{filter}*")
    }
}

// =============================================================================
// PizzaService
// =============================================================================

/// Client for the pizza service.
///
/// Cheap to clone; clones share the connection pool and the menu cache.
#[derive(Clone)]
pub struct PizzaService {
    inner: Arc<PizzaServiceInner>,
}

struct PizzaServiceInner {
    client: reqwest::Client,
    service_url: String,
    factory_url: String,
    menu_cache: Cache<&'static str, Arc<Vec<MenuItem>>>,
}

impl std::fmt::Debug for PizzaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PizzaService")
            .field("service_url", &self.inner.service_url)
            .field("factory_url", &self.inner.factory_url)
            .finish_non_exhaustive()
    }
}

impl PizzaService {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("jwt-pizza-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let menu_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.menu_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(PizzaServiceInner {
                client,
                service_url: config.service_url.as_str().trim_end_matches('/').to_string(),
                factory_url: config.factory_url.as_str().trim_end_matches('/').to_string(),
                menu_cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&AuthToken>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.service_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.bearer()),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            debug!(status = %status, message = %message, "Pizza service returned non-success status");
            return Err(PizzaError::Api { status, message });
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse pizza service response"
            );
            PizzaError::Parse(e)
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// A 401 `PizzaError::Api` for unknown users and wrong passwords.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthResponse> {
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.send(self.request(Method::PUT, "/api/auth", None).json(&body))
            .await
    }

    /// Register a new diner.
    ///
    /// # Errors
    ///
    /// A 409 `PizzaError::Api` if the email is already registered.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse> {
        let body = json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        });
        self.send(self.request(Method::POST, "/api/auth", None).json(&body))
            .await
    }

    /// Invalidate the token on the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &AuthToken) -> Result<()> {
        self.send_raw(self.request(Method::DELETE, "/api/auth", Some(token)))
            .await
            .map(drop)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// The user the token belongs to. An empty or `null` answer means none.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects the token.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &AuthToken) -> Result<Option<User>> {
        let body = self
            .send_raw(self.request(Method::GET, "/api/user/me", Some(token)))
            .await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<User>>(&body)?)
    }

    /// Update the profile of a user. The password is only sent when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service refuses the update.
    #[instrument(skip(self, token, password), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        token: &AuthToken,
        user_id: UserId,
        name: &str,
        email: &Email,
        password: Option<&SecretString>,
    ) -> Result<AuthResponse> {
        let mut body = json!({
            "name": name,
            "email": email,
        });
        if let Some(password) = password {
            body["password"] = Value::String(password.expose_secret().to_string());
        }
        self.send(
            self.request(Method::PUT, &format!("/api/user/{user_id}"), Some(token))
                .json(&body),
        )
        .await
    }

    /// One page of users whose name matches the filter (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token))]
    pub async fn list_users(
        &self,
        token: &AuthToken,
        page: u32,
        limit: u32,
        filter: &str,
    ) -> Result<UserList> {
        self.send(
            self.request(Method::GET, "/api/user", Some(token))
                .query(&[
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                    ("name", wildcard(filter)),
                ]),
        )
        .await
    }

    /// Delete a user (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token))]
    pub async fn delete_user(&self, token: &AuthToken, user_id: UserId) -> Result<()> {
        self.send_raw(self.request(Method::DELETE, &format!("/api/user/{user_id}"), Some(token)))
            .await
            .map(drop)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The menu, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu is not cached and the request fails.
    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<Arc<Vec<MenuItem>>> {
        if let Some(menu) = self.inner.menu_cache.get(MENU_CACHE_KEY).await {
            debug!("Cache hit for menu");
            return Ok(menu);
        }

        let menu: Vec<MenuItem> = self
            .send(self.request(Method::GET, "/api/order/menu", None))
            .await?;
        let menu = Arc::new(menu);

        self.inner
            .menu_cache
            .insert(MENU_CACHE_KEY, Arc::clone(&menu))
            .await;
        Ok(menu)
    }

    /// Drop the cached menu so the next call refetches it.
    pub async fn invalidate_menu(&self) {
        self.inner.menu_cache.invalidate(MENU_CACHE_KEY).await;
    }

    /// One page of the diner's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn order_history(&self, token: &AuthToken, page: u32) -> Result<OrderHistory> {
        self.send(
            self.request(Method::GET, "/api/order", Some(token))
                .query(&[("page", page)]),
        )
        .await
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service refuses the order.
    #[instrument(skip(self, token, order), fields(items = order.items.len()))]
    pub async fn place_order(&self, token: &AuthToken, order: &Order) -> Result<OrderReceipt> {
        self.send(
            self.request(Method::POST, "/api/order", Some(token))
                .json(order),
        )
        .await
    }

    /// Ask the pizza factory whether a settlement token is authentic.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the factory rejects the token.
    #[instrument(skip_all)]
    pub async fn verify_order(&self, token: &AuthToken, jwt: &str) -> Result<OrderVerification> {
        let url = format!("{}/api/order/verify", self.inner.factory_url);
        self.send(
            self.inner
                .client
                .post(url)
                .header(reqwest::header::AUTHORIZATION, token.bearer())
                .json(&json!({ "jwt": jwt })),
        )
        .await
    }

    // =========================================================================
    // Franchises
    // =========================================================================

    /// One page of franchises whose name matches the filter.
    ///
    /// Works without a token; the token only matters to admins, who also see
    /// store revenue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_franchises(
        &self,
        token: Option<&AuthToken>,
        page: u32,
        limit: u32,
        filter: &str,
    ) -> Result<FranchiseList> {
        self.send(
            self.request(Method::GET, "/api/franchise", token)
                .query(&[
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                    ("name", wildcard(filter)),
                ]),
        )
        .await
    }

    /// Franchises the user administers, with store revenue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn user_franchises(&self, token: &AuthToken, user_id: UserId) -> Result<Vec<Franchise>> {
        self.send(self.request(Method::GET, &format!("/api/franchise/{user_id}"), Some(token)))
            .await
    }

    /// Create a franchise administered by the given users (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token, admins))]
    pub async fn create_franchise(
        &self,
        token: &AuthToken,
        name: &str,
        admins: &[Email],
    ) -> Result<Franchise> {
        let admins: Vec<Value> = admins.iter().map(|email| json!({ "email": email })).collect();
        self.send(
            self.request(Method::POST, "/api/franchise", Some(token))
                .json(&json!({ "name": name, "admins": admins })),
        )
        .await
    }

    /// Close a franchise and all of its stores (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token))]
    pub async fn close_franchise(&self, token: &AuthToken, franchise_id: FranchiseId) -> Result<()> {
        self.send_raw(self.request(
            Method::DELETE,
            &format!("/api/franchise/{franchise_id}"),
            Some(token),
        ))
        .await
        .map(drop)
    }

    /// Open a store (franchisee of that franchise, or admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token))]
    pub async fn create_store(
        &self,
        token: &AuthToken,
        franchise_id: FranchiseId,
        name: &str,
    ) -> Result<Store> {
        self.send(
            self.request(
                Method::POST,
                &format!("/api/franchise/{franchise_id}/store"),
                Some(token),
            )
            .json(&json!({ "name": name })),
        )
        .await
    }

    /// Close a store (franchisee of that franchise, or admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service denies it.
    #[instrument(skip(self, token))]
    pub async fn close_store(
        &self,
        token: &AuthToken,
        franchise_id: FranchiseId,
        store_id: StoreId,
    ) -> Result<()> {
        self.send_raw(self.request(
            Method::DELETE,
            &format!("/api/franchise/{franchise_id}/store/{store_id}"),
            Some(token),
        ))
        .await
        .map(drop)
    }

    // =========================================================================
    // Docs
    // =========================================================================

    /// The service's self-description.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn docs(&self) -> Result<ServiceDocs> {
        self.send(self.request(Method::GET, "/api/docs", None)).await
    }
}

/// Best human-readable message for a failed response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.message.or(parsed.error)
    {
        return message;
    }

    let preview: String = body.trim().chars().take(ERROR_BODY_PREVIEW).collect();
    if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        preview
    }
}
