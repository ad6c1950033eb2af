/// Auth Service tests on in-memory stores

use std::sync::Arc;

use taskboard_shared::service::{AuthService, LoginRequest, RegisterRequest};
use taskboard_shared::store::{MemoryUserStore, UserStore};
use taskboard_shared::ServiceError;

const SECRET: &str = "service-test-secret-at-least-32-bytes";

fn service() -> (AuthService, Arc<MemoryUserStore>) {
    let users = Arc::new(MemoryUserStore::new());
    (AuthService::new(users.clone(), SECRET), users)
}

fn register_request(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse".to_string(),
    }
}

#[tokio::test]
async fn test_register_stores_hashed_password() {
    let (auth, users) = service();

    let session = auth
        .register(register_request("alice", "Alice@Example.com"))
        .await
        .unwrap();

    assert_eq!(session.user.email, "alice@example.com");
    let stored = users.find_by_id(session.user.id).await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert_ne!(stored.password_hash, "correct horse");
}

#[tokio::test]
async fn test_register_token_verifies_to_new_user() {
    let (auth, _) = service();
    let session = auth
        .register(register_request("alice", "alice@example.com"))
        .await
        .unwrap();

    let caller = auth
        .verify_token(Some(&format!("Bearer {}", session.token)))
        .unwrap();
    assert_eq!(caller.user_id, session.user.id);
    assert_eq!(caller.username, "alice");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (auth, users) = service();
    auth.register(register_request("alice", "alice@example.com"))
        .await
        .unwrap();

    let result = auth
        .register(register_request("alice2", "ALICE@example.com"))
        .await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(users.len().await, 1);
}

#[tokio::test]
async fn test_username_longer_than_fifty_rejected() {
    let (auth, _) = service();
    let long_name = "a".repeat(51);

    let result = auth
        .register(register_request(&long_name, "a@example.com"))
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let ok_name = "b".repeat(50);
    assert!(auth
        .register(register_request(&ok_name, "b@example.com"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let (auth, _) = service();
    auth.register(register_request("alice", "alice@example.com"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(LoginRequest {
            email: "bob@example.com".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
    assert!(matches!(unknown_email, ServiceError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_login_normalizes_email() {
    let (auth, _) = service();
    let registered = auth
        .register(register_request("alice", "alice@example.com"))
        .await
        .unwrap();

    let session = auth
        .login(LoginRequest {
            email: "  ALICE@example.com ".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.user.id, registered.user.id);
}

#[tokio::test]
async fn test_profile_of_missing_user_is_not_found() {
    let (auth, _) = service();

    let result = auth.profile(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_token_from_other_secret_is_invalid() {
    let (auth, _) = service();
    let other = AuthService::new(
        Arc::new(MemoryUserStore::new()),
        "a-completely-different-secret-of-32-bytes",
    );
    let session = other
        .register(register_request("alice", "alice@example.com"))
        .await
        .unwrap();

    let result = auth.verify_token(Some(&format!("Bearer {}", session.token)));
    assert!(matches!(result, Err(ServiceError::InvalidToken(_))));
}
