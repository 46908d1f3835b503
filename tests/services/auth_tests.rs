//! Authentication flow tests: registration, login, refresh rotation,
//! and revocation, running against in-memory user and session stores.

use std::sync::Arc;

use degentalk::application::services::auth_service::decode_access_token;
use degentalk::application::services::{AuthError, AuthService, AuthServiceImpl};
use degentalk::domain::UserRole;

use crate::common::{self, FakeSessionRepository, FakeUserRepository};

type Svc = AuthServiceImpl<FakeUserRepository, FakeSessionRepository>;

fn service(users: Arc<FakeUserRepository>, sessions: Arc<FakeSessionRepository>) -> Svc {
    AuthServiceImpl::new(users, sessions, common::id_gen(), common::jwt_settings())
}

#[tokio::test]
async fn register_issues_decodable_tokens() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    let (user, tokens) = svc
        .register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    assert_eq!(user.username, "degen");
    assert_eq!(user.role, UserRole::User);
    assert_eq!(tokens.token_type, "Bearer");

    let claims = decode_access_token(&tokens.access_token, &common::jwt_settings().secret)
        .expect("access token should decode");
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.role(), UserRole::User);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    svc.register("first", "taken@example.com", "hunter22hunter22")
        .await
        .expect("first registration failed");

    let err = svc
        .register("second", "taken@example.com", "hunter22hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailExists));
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    svc.register("degen", "one@example.com", "hunter22hunter22")
        .await
        .expect("first registration failed");

    let err = svc
        .register("degen", "two@example.com", "hunter22hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UsernameExists));
}

#[tokio::test]
async fn authenticate_accepts_registered_credentials() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    svc.register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    let tokens = svc
        .authenticate("degen@example.com", "hunter22hunter22")
        .await
        .expect("login failed");
    assert!(!tokens.access_token.is_empty());
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    svc.register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    let err = svc
        .authenticate("degen@example.com", "wrong-password-00")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn authenticate_rejects_unknown_email() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    let err = svc
        .authenticate("ghost@example.com", "hunter22hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn refresh_rotates_the_refresh_token() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    let (_, tokens) = svc
        .register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    let rotated = svc
        .refresh_token(&tokens.refresh_token)
        .await
        .expect("refresh failed");
    assert_ne!(rotated.refresh_token, tokens.refresh_token);

    // The pre-rotation token no longer maps to a session
    let err = svc.refresh_token(&tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::SessionNotFound));

    // The rotated token keeps working
    svc.refresh_token(&rotated.refresh_token)
        .await
        .expect("rotated token should refresh");
}

#[tokio::test]
async fn refresh_reflects_role_changes() {
    let users = FakeUserRepository::new();
    let svc = service(users.clone(), FakeSessionRepository::new());

    let (user, tokens) = svc
        .register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    use degentalk::domain::UserRepository;
    users
        .set_role(user.id, UserRole::Moderator)
        .await
        .expect("set_role failed");

    let rotated = svc
        .refresh_token(&tokens.refresh_token)
        .await
        .expect("refresh failed");
    let claims = decode_access_token(&rotated.access_token, &common::jwt_settings().secret)
        .expect("access token should decode");
    assert_eq!(claims.role(), UserRole::Moderator);
}

#[tokio::test]
async fn revoked_session_cannot_refresh() {
    let svc = service(FakeUserRepository::new(), FakeSessionRepository::new());

    let (_, tokens) = svc
        .register("degen", "degen@example.com", "hunter22hunter22")
        .await
        .expect("registration failed");

    svc.revoke_token(&tokens.refresh_token)
        .await
        .expect("revoke failed");

    let err = svc.refresh_token(&tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
}
