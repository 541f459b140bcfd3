//! Integration tests for the JWT Pizza client.
//!
//! The tests drive a [`Storefront`](jwt_pizza_client::Storefront) against
//! [`MockPizzaService`], an in-process axum server that answers like the
//! real pizza service with a fixed data set:
//!
//! | Email       | Password | Name       | Role                    |
//! |-------------|----------|------------|-------------------------|
//! | `d@jwt.com` | `a`      | Kai Chen   | diner                   |
//! | `f@jwt.com` | `a`      | Fran Chise | franchisee of franchise 2 |
//! | `a@jwt.com` | `a`      | Ad Min     | admin                   |
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p jwt-pizza-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use jwt_pizza_client::{ClientConfig, PizzaService, Storefront};

/// Token issued on login.
pub const LOGIN_TOKEN: &str = "abcdef";
/// Token issued on registration.
pub const REGISTER_TOKEN: &str = "ghijkl";
/// Settlement token returned with every order.
pub const ORDER_JWT: &str = "eyJpYXQ";

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    name: String,
    email: String,
    password: String,
    roles: Value,
}

impl MockUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "name": self.name,
            "email": self.email,
            "roles": self.roles,
        })
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles
            .as_array()
            .is_some_and(|roles| roles.iter().any(|r| r["role"] == role))
    }

    fn runs_franchise(&self, franchise_id: i64) -> bool {
        let id = franchise_id.to_string();
        self.roles.as_array().is_some_and(|roles| {
            roles
                .iter()
                .any(|r| r["role"] == "franchisee" && r["objectId"] == id.as_str())
        })
    }
}

#[derive(Debug)]
struct MockState {
    users: HashMap<String, MockUser>,
    tokens: HashMap<String, String>,
    franchises: Vec<Value>,
    next_id: i64,
    menu_requests: usize,
    orders: Vec<Value>,
    franchise_filters: Vec<String>,
    logged_out: Vec<String>,
    fail_logout: bool,
}

impl MockState {
    fn seeded() -> Self {
        let users = [
            (3, "Kai Chen", "d@jwt.com", json!([{ "role": "diner" }])),
            (
                4,
                "Fran Chise",
                "f@jwt.com",
                json!([{ "role": "franchisee", "objectId": "2" }]),
            ),
            (5, "Ad Min", "a@jwt.com", json!([{ "role": "admin" }])),
        ]
        .into_iter()
        .map(|(id, name, email, roles)| {
            (
                email.to_string(),
                MockUser {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    password: "a".to_string(),
                    roles,
                },
            )
        })
        .collect();

        let franchises = vec![
            json!({
                "id": 2,
                "name": "LotaPizza",
                "stores": [
                    { "id": 4, "name": "Lehi" },
                    { "id": 5, "name": "Springville" },
                    { "id": 6, "name": "American Fork" },
                ],
            }),
            json!({ "id": 3, "name": "PizzaCorp", "stores": [{ "id": 7, "name": "Spanish Fork" }] }),
            json!({ "id": 4, "name": "topSpot", "stores": [] }),
        ];

        Self {
            users,
            tokens: HashMap::new(),
            franchises,
            next_id: 100,
            menu_requests: 0,
            orders: Vec::new(),
            franchise_filters: Vec::new(),
            logged_out: Vec::new(),
            fail_logout: false,
        }
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<&MockUser> {
        let email = self.tokens.get(bearer(headers)?)?;
        self.users.get(email)
    }

    fn issue(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<MockState>>;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "unauthorized")
}

/// Case-insensitive match against a `*text*` filter.
fn name_matches(name: &str, filter: Option<&String>) -> bool {
    let needle = filter
        .map(|f| f.replace('*', "").trim().to_lowercase())
        .unwrap_or_default();
    needle.is_empty() || name.to_lowercase().contains(&needle)
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(req): Json<LoginRequest>) -> Response {
    let mut state = state.lock().await;
    let Some(user) = state.users.get(&req.email).cloned() else {
        return error(StatusCode::UNAUTHORIZED, "unknown user");
    };
    if user.password != req.password {
        return error(StatusCode::UNAUTHORIZED, "unknown user");
    }
    state.tokens.insert(LOGIN_TOKEN.to_string(), user.email.clone());
    Json(json!({ "user": user.to_json(), "token": LOGIN_TOKEN })).into_response()
}

async fn register(State(state): State<Shared>, Json(req): Json<RegisterRequest>) -> Response {
    let mut state = state.lock().await;
    if state.users.contains_key(&req.email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "User already exists" })),
        )
            .into_response();
    }
    let user = MockUser {
        id: state.issue(),
        name: req.name,
        email: req.email.clone(),
        password: req.password,
        roles: json!([{ "role": "diner" }]),
    };
    let body = json!({ "user": user.to_json(), "token": REGISTER_TOKEN });
    state.users.insert(req.email.clone(), user);
    state.tokens.insert(REGISTER_TOKEN.to_string(), req.email);
    Json(body).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().await;
    if state.fail_logout {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "logout failed");
    }
    let Some(token) = bearer(&headers).map(str::to_string) else {
        return unauthorized();
    };
    if state.tokens.remove(&token).is_none() {
        return unauthorized();
    }
    state.logged_out.push(token);
    Json(json!({ "message": "logout successful" })).into_response()
}

// =============================================================================
// Users
// =============================================================================

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().await;
    if let Some(user) = state.user_for(&headers) {
        return Json(user.to_json()).into_response();
    }
    // Nobody is logged in with a token that was logged out; any other token is rejected.
    match bearer(&headers) {
        Some(token) if !state.logged_out.iter().any(|t| t == token) => unauthorized(),
        _ => StatusCode::OK.into_response(),
    }
}

#[derive(Deserialize)]
struct UpdateRequest {
    name: String,
    email: String,
    password: Option<String>,
}

async fn update_user(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequest>,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers).cloned() else {
        return unauthorized();
    };
    if caller.id != id && !caller.has_role("admin") {
        return error(StatusCode::FORBIDDEN, "unauthorized");
    }
    let Some(mut user) = state.users.values().find(|u| u.id == id).cloned() else {
        return error(StatusCode::NOT_FOUND, "unknown user");
    };
    state.users.remove(&user.email);
    user.name = req.name;
    user.email = req.email;
    if let Some(password) = req.password {
        user.password = password;
    }
    let token = format!("updated-{}", user.id);
    state.tokens.insert(token.clone(), user.email.clone());
    let body = json!({ "user": user.to_json(), "token": token });
    state.users.insert(user.email.clone(), user);
    Json(body).into_response()
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") {
        return error(StatusCode::FORBIDDEN, "unable to list users");
    }
    let mut users: Vec<&MockUser> = state
        .users
        .values()
        .filter(|u| name_matches(&u.name, query.get("name")))
        .collect();
    users.sort_by_key(|u| u.id);
    let users: Vec<Value> = users.into_iter().map(MockUser::to_json).collect();
    Json(json!({ "users": users, "more": false })).into_response()
}

async fn delete_user(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") {
        return error(StatusCode::FORBIDDEN, "unable to delete user");
    }
    state.users.retain(|_, u| u.id != id);
    Json(json!({ "message": "user deleted" })).into_response()
}

// =============================================================================
// Orders
// =============================================================================

async fn menu(State(state): State<Shared>) -> Json<Value> {
    state.lock().await.menu_requests += 1;
    Json(json!([
        {
            "id": 1,
            "title": "Veggie",
            "image": "pizza1.png",
            "price": 0.0038,
            "description": "A garden of delight",
        },
        {
            "id": 2,
            "title": "Pepperoni",
            "image": "pizza2.png",
            "price": 0.0042,
            "description": "Spicy treat",
        },
    ]))
}

async fn order_history(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().await;
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    Json(json!({
        "dinerId": user.id,
        "orders": [{
            "id": 23,
            "date": "2024-06-05T05:14:40.000Z",
            "items": [
                { "title": "Veggie", "price": 0.0038 },
                { "title": "Pepperoni", "price": 0.0042 },
            ],
        }],
        "page": 1,
    }))
    .into_response()
}

async fn place_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut order): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    state.orders.push(order.clone());
    order["id"] = json!(23);
    Json(json!({ "order": order, "jwt": ORDER_JWT })).into_response()
}

async fn verify_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().await;
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    if body["jwt"] == ORDER_JWT {
        Json(json!({ "message": "valid", "payload": { "vendor": { "id": "jwt-pizza" } } }))
            .into_response()
    } else {
        error(StatusCode::BAD_REQUEST, "invalid")
    }
}

// =============================================================================
// Franchises
// =============================================================================

async fn list_franchises(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut state = state.lock().await;
    if let Some(name) = query.get("name") {
        state.franchise_filters.push(name.clone());
    }
    let franchises: Vec<Value> = state
        .franchises
        .iter()
        .filter(|f| name_matches(f["name"].as_str().unwrap_or_default(), query.get("name")))
        .cloned()
        .collect();
    Json(json!({ "franchises": franchises, "more": false }))
}

async fn user_franchises(
    State(state): State<Shared>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if caller.id != user_id || !caller.has_role("franchisee") {
        return Json(json!([])).into_response();
    }
    Json(json!([{
        "id": 2,
        "name": "LotaPizza",
        "admins": [{ "id": caller.id, "name": caller.name, "email": caller.email }],
        "stores": [
            { "id": 4, "name": "Lehi", "totalRevenue": 100 },
            { "id": 5, "name": "Springville", "totalRevenue": 250 },
        ],
    }]))
    .into_response()
}

#[derive(Deserialize)]
struct CreateFranchiseRequest {
    name: String,
    admins: Vec<Value>,
}

async fn create_franchise(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(req): Json<CreateFranchiseRequest>,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") {
        return error(StatusCode::FORBIDDEN, "unable to create a franchise");
    }
    let franchise = json!({
        "id": state.issue(),
        "name": req.name,
        "admins": req.admins,
        "stores": [],
    });
    state.franchises.push(franchise.clone());
    Json(franchise).into_response()
}

async fn close_franchise(
    State(state): State<Shared>,
    Path(franchise_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") {
        return error(StatusCode::FORBIDDEN, "unable to delete a franchise");
    }
    state.franchises.retain(|f| f["id"] != franchise_id);
    Json(json!({ "message": "franchise deleted" })).into_response()
}

#[derive(Deserialize)]
struct CreateStoreRequest {
    name: String,
}

async fn create_store(
    State(state): State<Shared>,
    Path(franchise_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateStoreRequest>,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") && !caller.runs_franchise(franchise_id) {
        return error(StatusCode::FORBIDDEN, "unable to create a store");
    }
    let store = json!({ "id": state.issue(), "franchiseId": franchise_id, "name": req.name });
    if let Some(franchise) = state.franchises.iter_mut().find(|f| f["id"] == franchise_id)
        && let Some(stores) = franchise["stores"].as_array_mut()
    {
        stores.push(store.clone());
    }
    Json(store).into_response()
}

async fn close_store(
    State(state): State<Shared>,
    Path((franchise_id, store_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().await;
    let Some(caller) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !caller.has_role("admin") && !caller.runs_franchise(franchise_id) {
        return error(StatusCode::FORBIDDEN, "unable to delete a store");
    }
    if let Some(franchise) = state.franchises.iter_mut().find(|f| f["id"] == franchise_id)
        && let Some(stores) = franchise["stores"].as_array_mut()
    {
        stores.retain(|s| s["id"] != store_id);
    }
    Json(json!({ "message": "store deleted" })).into_response()
}

async fn docs() -> Json<Value> {
    Json(json!({
        "version": "20240518.154317",
        "endpoints": [
            { "method": "PUT", "path": "/api/auth", "description": "Login existing user" },
            { "method": "GET", "path": "/api/user/me", "description": "Get authenticated user", "requiresAuth": true },
        ],
        "config": { "factory": "http://localhost", "db": "localhost" },
    }))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth", post(register).put(login).delete(logout))
        .route("/api/user/me", get(me))
        .route("/api/user", get(list_users))
        .route("/api/user/{id}", delete(delete_user).put(update_user))
        .route("/api/order/menu", get(menu))
        .route("/api/order", get(order_history).post(place_order))
        .route("/api/order/verify", post(verify_order))
        .route("/api/franchise", get(list_franchises).post(create_franchise))
        .route("/api/franchise/{id}", get(user_franchises).delete(close_franchise))
        .route("/api/franchise/{id}/store", post(create_store))
        .route("/api/franchise/{id}/store/{store_id}", delete(close_store))
        .route("/api/docs", get(docs))
        .with_state(state)
}

// =============================================================================
// MockPizzaService
// =============================================================================

/// A running mock pizza service. Also serves the factory's verify endpoint.
#[derive(Debug, Clone)]
pub struct MockPizzaService {
    url: String,
    state: Shared,
}

impl MockPizzaService {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let state = Arc::new(Mutex::new(MockState::seeded()));

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { url, state })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client configuration pointing both the service and the factory here.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is rejected.
    pub fn config(&self) -> Result<ClientConfig, jwt_pizza_client::ConfigError> {
        let mut config = ClientConfig::for_service(&self.url)?;
        config.factory_url = config.service_url.clone();
        Ok(config)
    }

    /// A fresh, logged-out storefront talking to this service.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn storefront(&self) -> jwt_pizza_client::Result<Storefront> {
        Ok(Storefront::new(PizzaService::new(&self.config()?)?))
    }

    /// How many times the menu was fetched.
    pub async fn menu_requests(&self) -> usize {
        self.state.lock().await.menu_requests
    }

    /// Order bodies received, oldest first.
    pub async fn orders(&self) -> Vec<Value> {
        self.state.lock().await.orders.clone()
    }

    /// `name` query values received by the franchise listing.
    pub async fn franchise_filters(&self) -> Vec<String> {
        self.state.lock().await.franchise_filters.clone()
    }

    /// Revoke every issued token, as if the service restarted.
    pub async fn revoke_tokens(&self) {
        self.state.lock().await.tokens.clear();
    }

    /// Make logout answer with a server error.
    pub async fn fail_logout(&self) {
        self.state.lock().await.fail_logout = true;
    }
}
