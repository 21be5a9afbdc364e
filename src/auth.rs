use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, errors::ApiError, models::Role};

/// How long an issued identity assertion stays valid.
pub const TOKEN_TTL_SECS: i64 = 5 * 60 * 60;

/// The single custom header carrying the token on protected requests.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Claims
///
/// The payload structure embedded in every issued JSON Web Token (JWT).
/// These claims are signed with the server's secret and validated upon every
/// authenticated request.
///
/// The `username` and `role` fields are a snapshot taken at login or
/// registration time; they do not auto-refresh if the persisted record
/// changes later. Authorization decisions that depend on the *current* role
/// must re-read the store (see `policy`).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user.
    pub sub: Uuid,
    /// Display name snapshot, denormalized into courses at create time.
    pub username: String,
    /// Role snapshot at issuance time.
    pub role: Role,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    pub exp: usize,
}

/// issue_token
///
/// Produces a signed assertion embedding `{id, username, role}`, expiring
/// [`TOKEN_TTL_SECS`] after issuance. Pure computation; no side effects.
pub fn issue_token(
    id: Uuid,
    username: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: id,
        username: username.to_string(),
        role,
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request: the decoded token
/// payload, attached to the request context for downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    /// The role *as of token issuance*. Handlers that gate mutations must not
    /// trust this snapshot; they re-read the persisted role instead.
    pub role: Role,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler. This cleanly separates
/// authentication (extractor) from business logic (the handler).
///
/// The process:
/// 1. Header extraction: the token travels in the `x-auth-token` header.
/// 2. Token validation: signature and expiry check against the process secret.
///
/// Deliberately **no database lookup** happens here. The gate trusts the
/// token's embedded snapshot; every mutation re-reads the current roles from
/// the store, so a stale snapshot can never grant stale privilege.
///
/// Rejection: 401 with a `{msg}` body on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the signing secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Header Extraction
        // The token is carried raw in a single custom header; there is no
        // "Bearer" prefix on this API.
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated("No token, authorization denied".to_string())
            })?;

        // 2. Decode and Validate the Token
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                return Err(match e.kind() {
                    // Token expired: the most common failure for a valid-but-old token.
                    ErrorKind::ExpiredSignature => {
                        ApiError::Unauthenticated("Token is not valid".to_string())
                    }
                    // Catch all other failure types (bad signature, malformed token, etc.).
                    _ => ApiError::Unauthenticated("Token is not valid".to_string()),
                });
            }
        };

        let claims = token_data.claims;

        // Success: attach the decoded identity to the request context.
        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
