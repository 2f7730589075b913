//! API integration tests
//!
//! These run against a live server with a seeded admin account
//! (admin@leafstack.com / admin123). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to get an authenticated admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@leafstack.com",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to register a fresh member and return (token, user id)
async fn register_member(client: &Client) -> (String, String) {
    let suffix = Uuid::new_v4().simple().to_string();
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": format!("member-{}", suffix),
            "name": "Test Member",
            "email": format!("member-{}@example.org", suffix),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    (
        body["token"].as_str().expect("No token").to_string(),
        body["user"]["id"].as_str().expect("No user id").to_string(),
    )
}

/// Helper to create a book with the given copy count, returns its id
async fn create_book(client: &Client, token: &str, copies: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author": "Test Author",
            "isbn": format!("978-{}", suffix),
            "category": "Testing",
            "copies": copies
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    assert_eq!(body["available"], body["copies"]);
    body["id"].as_str().expect("No book id").to_string()
}

#[tokio::test]
#[ignore]
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@leafstack.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_books() {
    let client = Client::new();
    let (member_token, _) = register_member(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({
            "title": "Forbidden",
            "author": "Nobody",
            "isbn": "978-0-00-000000-0",
            "category": "Testing",
            "copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflict() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let isbn = format!("978-{}", Uuid::new_v4().simple());
    let book = json!({
        "title": "Original",
        "author": "Author",
        "isbn": isbn,
        "category": "Testing",
        "copies": 1
    });

    let first = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 409);
}

/// Full lifecycle: register, empty loan list, borrow with a 14-day due
/// date, availability bookkeeping, second borrow refused, return,
/// double return refused.
#[tokio::test]
#[ignore]
async fn test_borrow_return_lifecycle() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, _member_id) = register_member(&client).await;

    // Fresh member has no borrows
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    let loans: Value = response.json().await.expect("Failed to parse loans");
    assert_eq!(loans.as_array().expect("not an array").len(), 0);

    // One copy in the catalog
    let book_id = create_book(&client, &admin_token, 1).await;

    // Borrow it
    let response = client
        .post(format!("{}/loans/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let borrow: Value = response.json().await.expect("Failed to parse borrow");
    let borrow_id = borrow["id"].as_str().expect("No borrow id").to_string();
    assert_eq!(borrow["isOverdue"], false);

    // Due date is exactly 14 days after borrowedAt
    let borrowed_at: chrono::DateTime<chrono::Utc> =
        borrow["borrowedAt"].as_str().unwrap().parse().unwrap();
    let due_date: chrono::DateTime<chrono::Utc> =
        borrow["dueDate"].as_str().unwrap().parse().unwrap();
    assert_eq!(due_date - borrowed_at, chrono::Duration::days(14));

    // The copy is gone; a second borrow fails with a 400
    let response = client
        .post(format!("{}/loans/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Book cannot be deleted while the borrow is open
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Return the book
    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let returned: Value = response.json().await.expect("Failed to parse return");
    assert!(returned["returnedAt"].is_string());
    assert_eq!(returned["isOverdue"], false);

    // Availability is back to 1
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse books");
    let book = books
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == book_id.as_str())
        .expect("Book not in catalog");
    assert_eq!(book["available"], 1);

    // Second return of the same borrow fails
    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // With the borrow closed, the delete goes through
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

/// Launching more simultaneous borrows than there are copies yields
/// exactly `copies` successes; the rest are refused.
#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_never_oversell() {
    const ATTEMPTS: usize = 6;
    const COPIES: i64 = 2;

    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, _) = register_member(&client).await;
    let book_id = create_book(&client, &admin_token, COPIES).await;

    let mut handles = Vec::new();
    for _ in 0..ATTEMPTS {
        let client = client.clone();
        let token = member_token.clone();
        let book_id = book_id.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{}/loans/borrow", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({ "bookId": book_id }))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }));
    }

    let mut successes = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            201 => successes += 1,
            400 => refused += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(successes, COPIES as usize);
    assert_eq!(refused, ATTEMPTS - COPIES as usize);
}

#[tokio::test]
#[ignore]
async fn test_member_delete_blocked_by_open_borrow() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, member_id) = register_member(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/loans/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({ "bookId": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let borrow: Value = response.json().await.unwrap();
    let borrow_id = borrow["id"].as_str().unwrap().to_string();

    // Open borrow blocks the delete
    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Close it; the delete now cascades the history
    let response = client
        .put(format!("{}/loans/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_borrow_for_someone_else() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, _) = register_member(&client).await;
    let (_, other_member_id) = register_member(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let response = client
        .post(format!("{}/loans/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({ "bookId": book_id, "memberId": other_member_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

/// Admin-created members get the default password and can log in with it
#[tokio::test]
#[ignore]
async fn test_admin_adds_member_with_default_password() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, _) = register_member(&client).await;

    let email = format!("added-{}@example.org", Uuid::new_v4().simple());
    let body = json!({
        "name": "Walk-in Member",
        "email": email,
        "phone": "555-0100"
    });

    // Members cannot use the endpoint
    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse member");
    assert_eq!(created["email"], email.as_str());
    assert_eq!(created["phone"], "555-0100");

    // Same email again conflicts
    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // The new member can log in with the default password
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let login: Value = response.json().await.expect("Failed to parse login");
    assert_eq!(login["user"]["role"], "member");
}

/// A member delete racing a borrow never strands a decremented copy:
/// either the delete is refused because the borrow won, or the borrow
/// fails and the decrement rolls back with it.
#[tokio::test]
#[ignore]
async fn test_member_delete_racing_borrow_keeps_accounting() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (member_token, member_id) = register_member(&client).await;
    let book_id = create_book(&client, &admin_token, 1).await;

    let borrow_handle = {
        let client = client.clone();
        let token = member_token.clone();
        let book_id = book_id.clone();
        tokio::spawn(async move {
            let response = client
                .post(format!("{}/loans/borrow", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({ "bookId": book_id }))
                .send()
                .await
                .expect("Failed to send request");
            let status = response.status().as_u16();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            (status, body)
        })
    };
    let delete_handle = {
        let client = client.clone();
        let token = admin_token.clone();
        let member_id = member_id.clone();
        tokio::spawn(async move {
            client
                .delete(format!("{}/members/{}", BASE_URL, member_id))
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        })
    };

    let (borrow_status, borrow_body) = borrow_handle.await.expect("task panicked");
    let delete_status = delete_handle.await.expect("task panicked");

    if borrow_status == 201 {
        // Borrow won: the delete must have been refused
        assert_eq!(delete_status, 400);

        let borrow_id = borrow_body["id"].as_str().expect("No borrow id");
        let response = client
            .put(format!("{}/loans/{}/return", BASE_URL, borrow_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);

        let response = client
            .delete(format!("{}/members/{}", BASE_URL, member_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
    } else {
        // Delete won: the borrow failed and its decrement rolled back
        assert_eq!(delete_status, 200);
    }

    // Either way the copy is accounted for
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse books");
    let book = books
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == book_id.as_str())
        .expect("Book not in catalog");
    assert_eq!(book["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_members_roster_requires_admin() {
    let client = Client::new();
    let (member_token, _) = register_member(&client).await;

    let response = client
        .get(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}
