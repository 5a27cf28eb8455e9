//! API integration tests against a running server

use reqwest::{multipart, Client};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn payload_form(payload: Value) -> multipart::Form {
    multipart::Form::new().text("payload", payload.to_string())
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_admin() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_employee_directory() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/employees/directory", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let territories: Vec<_> = body
        .as_array()
        .expect("Directory is not an array")
        .iter()
        .map(|group| group["territory"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(territories, vec!["martinique", "guadeloupe"]);
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_equipment() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Create a type to attach the equipment to
    let response = client
        .post(format!("{}/types", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": format!("Test type {}", uuid::Uuid::new_v4()) }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let type_id = body["id"].as_i64().expect("No type ID");

    // Create equipment with an invoice
    let invoice = multipart::Part::bytes(b"%PDF-1.4 test".to_vec())
        .file_name("invoice.pdf")
        .mime_str("application/pdf")
        .expect("Invalid mime type");
    let form = payload_form(json!({
        "type_id": type_id,
        "brand": "Dell",
        "model": "XPS13",
        "state": "Available",
        "price": "12,50"
    }))
    .part("invoice", invoice);

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let equipment_id = body["id"].as_i64().expect("No equipment ID");
    assert_eq!(body["price"], 12.5);

    let response = client
        .get(format!("{}/equipment/{}/invoice", BASE_URL, equipment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Delete equipment, then its type
    let response = client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/types/{}", BASE_URL, type_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_invalid_equipment_lists_errors() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(payload_form(json!({ "price": "-5" })))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["errors"].as_array().map(|e| !e.is_empty()).unwrap_or(false));
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_count"].is_number());
    assert!(body["total_value"].is_number());
    assert!(body["by_territory"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_export_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/export/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["average_value"].is_number());
    assert!(body["generated_at"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
