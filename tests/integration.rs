//! Integration tests against a live hosted backend.
//!
//! These tests require a reachable backend at BACKEND_URL.
//! Run with: cargo test --test integration -- --ignored

use plateperfect_api::backend::{BackendClient, FindQuery, MenuItem, Restaurant, User};
use plateperfect_api::config::Config;

/// Get a test config from environment.
fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();

    // Skip unless a backend is explicitly configured
    std::env::var("BACKEND_URL").ok()?;

    let config = Config::load().ok()?;
    config.validate().ok()?;
    Some(config)
}

/// Test that the backend answers the health probe.
#[tokio::test]
#[ignore = "requires BACKEND_URL"]
async fn test_probe_backend() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: BACKEND_URL not set or invalid");
            return;
        }
    };

    let client = BackendClient::new(&config);

    let result = client.probe().await;
    assert!(result.is_ok(), "Probe failed: {:?}", result.err());

    let report = result.unwrap();
    assert!(report.is_ok(), "Backend reported status {}", report.status);

    println!("Backend health: {:?}", report);
}

/// Test that restaurants can be listed publicly.
#[tokio::test]
#[ignore = "requires BACKEND_URL"]
async fn test_find_restaurants() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: BACKEND_URL not set or invalid");
            return;
        }
    };

    let client = BackendClient::new(&config);

    let query = FindQuery::new()
        .with_relation("owner")
        .order_by("createdAt", true);
    let result = client.from("restaurants").find::<Restaurant>(&query).await;
    assert!(result.is_ok(), "Find failed: {:?}", result.err());

    let response = result.unwrap();
    println!("Restaurants: {}", response.data.len());
}

/// Test the full session round trip when test credentials are provided.
#[tokio::test]
#[ignore = "requires BACKEND_URL, TEST_EMAIL, TEST_PASSWORD"]
async fn test_login_me_logout() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: BACKEND_URL not set or invalid");
            return;
        }
    };

    let (email, password) = match (
        std::env::var("TEST_EMAIL").ok(),
        std::env::var("TEST_PASSWORD").ok(),
    ) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            println!("Skipping: TEST_EMAIL/TEST_PASSWORD not set");
            return;
        }
    };

    let client = BackendClient::new(&config);

    client
        .login("users", &email, &password)
        .await
        .expect("login failed");
    assert!(client.is_authenticated().await);

    let user = client.me("users").await.expect("me() failed");
    assert_eq!(user.email, email);

    client.logout().await;
    assert!(!client.is_authenticated().await);
    assert!(client.me("users").await.is_err());
}

/// Test the dashboard's create flow: profile update, restaurant, menu item.
#[tokio::test]
#[ignore = "requires BACKEND_URL, TEST_EMAIL, TEST_PASSWORD"]
async fn test_create_restaurant_and_menu_item() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: BACKEND_URL not set or invalid");
            return;
        }
    };

    let (email, password) = match (
        std::env::var("TEST_EMAIL").ok(),
        std::env::var("TEST_PASSWORD").ok(),
    ) {
        (Some(e), Some(p)) => (e, p),
        _ => {
            println!("Skipping: TEST_EMAIL/TEST_PASSWORD not set");
            return;
        }
    };

    let client = BackendClient::new(&config);
    client
        .login("users", &email, &password)
        .await
        .expect("login failed");

    let user: User = client
        .from("users")
        .update(
            client.me("users").await.expect("me() failed").id,
            &serde_json::json!({ "name": "Integration Tester", "role": "owner" }),
        )
        .await
        .expect("profile update failed");
    assert_eq!(user.role.as_deref(), Some("owner"));

    let restaurant: Restaurant = client
        .from("restaurants")
        .create(&Restaurant {
            id: None,
            name: "Integration Test Bistro".to_string(),
            description: Some("created by the integration suite".to_string()),
            address: None,
            owner_id: user.id,
        })
        .await
        .expect("restaurant create failed");
    let restaurant_id = restaurant.id.expect("created restaurant has no id");

    let item: MenuItem = client
        .from("menu-items")
        .create(&MenuItem {
            id: None,
            name: "Margherita".to_string(),
            description: None,
            price: 11.5,
            category: "Main".to_string(),
            restaurant_id,
            owner_id: user.id,
        })
        .await
        .expect("menu item create failed");
    assert!(item.id.is_some());

    let menu = client
        .from("menu-items")
        .find::<MenuItem>(
            &FindQuery::new()
                .where_eq("restaurantId", restaurant_id)
                .order_by("createdAt", true),
        )
        .await
        .expect("menu find failed");
    assert!(menu.data.iter().any(|m| m.id == item.id));
}
