//! Franchisee and admin dashboards against the mock pizza service.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use jwt_pizza_client::{Capability, NavItem, Storefront};
use jwt_pizza_core::{FranchiseId, StoreId, UserId};
use jwt_pizza_integration_tests::MockPizzaService;
use secrecy::SecretString;

async fn logged_in(mock: &MockPizzaService, email: &str) -> Storefront {
    let mut storefront = mock.storefront().unwrap();
    storefront
        .login(email, &SecretString::from("a"))
        .await
        .unwrap();
    storefront
}

#[tokio::test]
async fn test_franchisee_dashboard() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "f@jwt.com").await;

    assert!(storefront.navigation().contains(&NavItem::Franchise { dashboard: true }));
    assert!(storefront.capabilities().allows(Capability::ManageStores(FranchiseId::new(2))));
    assert!(!storefront.capabilities().allows(Capability::ManageStores(FranchiseId::new(3))));

    let franchises = storefront.my_franchises().await.unwrap();
    assert_eq!(franchises.len(), 1);
    let lota = &franchises[0];
    assert_eq!(lota.name, "LotaPizza");
    assert_eq!(lota.store(StoreId::new(4)).unwrap().name, "Lehi");
    assert_eq!(lota.total_revenue().to_string(), "350 ₿");
}

#[tokio::test]
async fn test_diner_has_no_franchise() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "d@jwt.com").await;

    assert!(!storefront.capabilities().allows(Capability::FranchiseDashboard));
    assert!(storefront.my_franchises().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_franchisee_opens_and_closes_store() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "f@jwt.com").await;

    let store = storefront
        .create_store(FranchiseId::new(2), "  Orem ")
        .await
        .unwrap();
    assert_eq!(store.name, "Orem");

    let lota = storefront.franchises("LotaPizza", 0).await.unwrap();
    assert_eq!(lota.franchises[0].stores.len(), 4);

    storefront
        .close_store(FranchiseId::new(2), store.id)
        .await
        .unwrap();
    let lota = storefront.franchises("LotaPizza", 0).await.unwrap();
    assert_eq!(lota.franchises[0].stores.len(), 3);
}

#[tokio::test]
async fn test_service_refuses_store_in_foreign_franchise() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "f@jwt.com").await;

    let err = storefront
        .create_store(FranchiseId::new(3), "Provo")
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
}

#[tokio::test]
async fn test_admin_filters_franchises() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "a@jwt.com").await;

    assert!(storefront.navigation().contains(&NavItem::Admin));
    assert!(storefront.capabilities().allows(Capability::AdminDashboard));

    let found = storefront.franchises("Pizza", 0).await.unwrap();
    let names: Vec<&str> = found.franchises.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["LotaPizza", "PizzaCorp"]);
}

#[tokio::test]
async fn test_admin_creates_and_closes_franchise() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "a@jwt.com").await;

    let franchise = storefront
        .create_franchise("pizzaPocket", &["f@jwt.com"])
        .await
        .unwrap();
    assert_eq!(franchise.name, "pizzaPocket");
    assert_eq!(franchise.admins[0].email.as_str(), "f@jwt.com");

    storefront.close_franchise(franchise.id).await.unwrap();
    let found = storefront.franchises("pocket", 0).await.unwrap();
    assert!(found.franchises.is_empty());
}

#[tokio::test]
async fn test_admin_lists_and_deletes_users() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "a@jwt.com").await;

    let users = storefront.list_users("", 0).await.unwrap();
    assert_eq!(users.users.len(), 3);
    assert!(!users.more);

    let kai = storefront.list_users("kai", 0).await.unwrap();
    assert_eq!(kai.users.len(), 1);
    assert_eq!(kai.users[0].id, UserId::new(3));

    storefront.delete_user(UserId::new(3)).await.unwrap();
    assert!(storefront.list_users("kai", 0).await.unwrap().users.is_empty());
}

#[tokio::test]
async fn test_diner_cannot_list_users() {
    let mock = MockPizzaService::start().await.unwrap();
    let storefront = logged_in(&mock, "d@jwt.com").await;

    assert!(!storefront.capabilities().allows(Capability::ManageUsers));
    let err = storefront.list_users("", 0).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
}
