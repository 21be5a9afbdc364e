use axum::{
    extract::{FromRef, FromRequestParts},
    http::{Method, Request, Uri, header::HeaderValue, request::Parts},
};
use course_hub::{
    auth::{AUTH_HEADER, AuthUser, Claims, issue_token},
    config::AppConfig,
    errors::ApiError,
    models::Role,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

// --- Test State ---

// The authentication gate deliberately performs no repository lookup (the
// policy re-reads roles instead), so a state carrying only the configuration
// is enough to drive the extractor.
#[derive(Clone)]
struct TestState {
    config: AppConfig,
}

impl FromRef<TestState> for AppConfig {
    fn from_ref(state: &TestState) -> AppConfig {
        state.config.clone()
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn test_state() -> TestState {
    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    TestState { config }
}

fn create_token(user_id: Uuid, role: Role, exp_offset: i64, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        username: "tester".to_string(),
        role,
        iat: now as usize,
        // Saturating cast keeps far-past offsets from wrapping.
        exp: (now + exp_offset).max(0) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn parts_with_token(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts
        .headers
        .insert(AUTH_HEADER, HeaderValue::from_str(token).unwrap());
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_token() {
    let token = create_token(TEST_USER_ID, Role::Moderator, 3600, TEST_JWT_SECRET);
    let state = test_state();

    let mut parts = parts_with_token(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.username, "tester");
    assert_eq!(user.role, Role::Moderator);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let state = test_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated(_)));
    assert_eq!(err.to_string(), "No token, authorization denied");
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    // Default validation allows 60 seconds of leeway, so expire well past it.
    let token = create_token(TEST_USER_ID, Role::User, -3600, TEST_JWT_SECRET);
    let state = test_state();

    let mut parts = parts_with_token(&token);
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated(_)));
    assert_eq!(err.to_string(), "Token is not valid");
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signature() {
    let token = create_token(TEST_USER_ID, Role::Admin, 3600, "some-other-secret");
    let state = test_state();

    let mut parts = parts_with_token(&token);
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated(_)));
    assert_eq!(err.to_string(), "Token is not valid");
}

#[tokio::test]
async fn test_auth_failure_with_garbage_token() {
    let state = test_state();

    let mut parts = parts_with_token("not-a-jwt-at-all");
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated(_)));
}

#[tokio::test]
async fn test_issued_token_round_trips_through_the_extractor() {
    // A token produced by the issuing side must be accepted by the gate and
    // carry the full identity snapshot.
    let token = issue_token(TEST_USER_ID, "alice", Role::User, TEST_JWT_SECRET).unwrap();
    let state = test_state();

    let mut parts = parts_with_token(&token);
    let user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect("freshly issued token must validate");

    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::User);
}
