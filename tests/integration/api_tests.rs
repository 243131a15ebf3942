//! API integration tests
//!
//! These run against a live server with a seeded admin account
//! (admin@example.com / admin-password).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a fresh member account and return its token and user id
async fn register_member(client: &Client, tag: &str) -> (String, i64) {
    let email = format!(
        "{}-{}@example.com",
        tag,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "member-password",
            "first_name": "Test",
            "last_name": "Member"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse register response");
    let user_id = body["id"].as_i64().expect("No user id");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "member-password" }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();

    (token, user_id)
}

/// Log in as the seeded admin account
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@example.com",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book with the given inventory, returning its id
async fn create_book(client: &Client, admin_token: &str, inventory: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Sample Title",
            "author": "Sample Author",
            "cover": "SOFT",
            "inventory": inventory,
            "daily_fee": "1.00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book id")
}

async fn get_book(client: &Client, book_id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse response")
}

async fn create_borrowing(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrow_date": "2025-01-15",
            "expected_return_date": "2025-01-22",
            "book_id": book_id
        }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_reports_database_round_trip() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_book_list_is_open() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_borrowing_access_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrowings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_write_books() {
    let client = Client::new();
    let (token, _) = register_member(&client, "bookwrite").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody",
            "cover": "HARD",
            "inventory": 1,
            "daily_fee": "1.00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_borrowing_decrements_inventory_and_assigns_owner() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, user_id) = register_member(&client, "borrower").await;
    let book_id = create_book(&client, &admin_token, 5).await;

    let response = create_borrowing(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["user_id"].as_i64().unwrap(), user_id);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 4);
}

#[tokio::test]
#[ignore]
async fn test_create_borrowing_rejects_client_supplied_owner() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "strict").await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "borrow_date": "2025-01-15",
            "expected_return_date": "2025-01-22",
            "book_id": book_id,
            "user_id": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    // Unknown fields are rejected at deserialization
    assert!(response.status().is_client_error());

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_create_borrowing_with_zero_inventory_fails() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "empty").await;
    let book_id = create_book(&client, &admin_token, 0).await;

    let response = create_borrowing(&client, &token, book_id).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Inventory must be greater than 0.");

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 0);
}

#[tokio::test]
#[ignore]
async fn test_return_flow_and_double_return() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "returner").await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = create_borrowing(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["id"].as_i64().expect("No borrowing id");

    // First return succeeds and releases the inventory unit
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The book has been successfully returned.");
    assert_eq!(body["borrowing"]["is_active"], false);
    assert!(body["borrowing"]["actual_return_date"].is_string());

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 1);

    // Second return fails without touching inventory again
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "This book has already been returned.");

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_member_only_sees_own_borrowings() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token_a, user_a) = register_member(&client, "scoped-a").await;
    let (token_b, _) = register_member(&client, "scoped-b").await;
    let book_id = create_book(&client, &admin_token, 2).await;

    assert_eq!(create_borrowing(&client, &token_a, book_id).await.status(), 201);
    assert_eq!(create_borrowing(&client, &token_b, book_id).await.status(), 201);

    let response = client
        .get(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowings = body.as_array().expect("Expected an array");
    // A fresh member sees exactly their own single borrowing, never B's
    assert_eq!(borrowings.len(), 1);

    // Admin scoped to user A sees exactly user A's borrowings
    let response = client
        .get(format!("{}/borrowings?user_id={}", BASE_URL, user_a))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    let admin_view: Value = response.json().await.expect("Failed to parse response");
    let admin_borrowings = admin_view.as_array().expect("Expected an array");
    assert_eq!(admin_borrowings.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_retrieve_foreign_borrowing() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token_a, _) = register_member(&client, "foreign-a").await;
    let (token_b, _) = register_member(&client, "foreign-b").await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = create_borrowing(&client, &token_a, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["id"].as_i64().unwrap();

    // Invisible items are indistinguishable from missing ones
    let response = client
        .get(format!("{}/borrowings/{}", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_is_active_filter_partitions_results() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "filter").await;
    let book_id = create_book(&client, &admin_token, 2).await;

    let response = create_borrowing(&client, &token, book_id).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let returned_id = body["id"].as_i64().unwrap();

    client
        .post(format!("{}/borrowings/{}/return", BASE_URL, returned_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(create_borrowing(&client, &token, book_id).await.status(), 201);

    let fetch = |filter: &str| {
        let client = client.clone();
        let token = token.clone();
        let url = format!("{}/borrowings?is_active={}", BASE_URL, filter);
        async move {
            let response = client
                .get(url)
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .expect("Failed to send request");
            let body: Value = response.json().await.expect("Failed to parse response");
            body.as_array().expect("Expected an array").clone()
        }
    };

    let active = fetch("true").await;
    assert!(active.iter().all(|b| b["is_active"] == true));

    let returned = fetch("False").await;
    assert!(returned.iter().all(|b| b["is_active"] == false));
    assert!(returned.iter().any(|b| b["id"].as_i64() == Some(returned_id)));

    // Unrecognized values leave the set unfiltered
    let unfiltered = fetch("maybe").await;
    assert_eq!(unfiltered.len(), active.len() + returned.len());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "race").await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            create_borrowing(&client, &token, book_id).await.status().as_u16()
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.expect("Task panicked"));
    }

    assert_eq!(statuses.iter().filter(|&&s| s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|&&s| s == 400).count(), 4);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"].as_i64().unwrap(), 0);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_borrowings_is_rejected() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (token, _) = register_member(&client, "refdel").await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = create_borrowing(&client, &token, book_id).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = body["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Returned borrowings are history, not license to delete
    client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}
