use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Roles ---

/// Role
///
/// The RBAC tier of a user account. Stored as lowercase text in the `users`
/// table and parsed back through `TryFrom<String>`, so the enumerated set is
/// enforced on every row that leaves the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Regular account. May only mutate content it owns.
    #[default]
    User,
    /// Trusted account. May moderate any content not authored by an admin.
    Moderator,
    /// Full control, including the user-management panel. Created only by
    /// the startup seed, never through the API.
    Admin,
}

/// ParseRoleError
///
/// Raised when a role string read from the database or a request body falls
/// outside the enumerated set.
#[derive(Debug, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct ParseRoleError(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::try_from(value.as_str())
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record from the `users` table, including the
/// credential hash. This struct never crosses the API boundary; responses
/// use [`PublicUser`] instead.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub contribution_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PublicUser
///
/// The API-facing projection of a user record (no credential hash). Used by
/// the profile endpoint and the admin user-management panel.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub contribution_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            contribution_count: user.contribution_count,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Course
///
/// A shared course record from the `courses` table. The primary data
/// structure for the core business logic.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    /// External link to the course material itself.
    pub link: String,
    pub category: String,
    pub description: String,

    // FK to users.id (Owner). Immutable after creation.
    pub author_id: Uuid,
    /// Display name of the author, denormalized at write time from the
    /// token's username. Not kept in sync with later username changes.
    pub author_name: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// TopContributor
///
/// A leaderboard row: username plus the current contribution counter.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TopContributor {
    pub username: String,
    pub contribution_count: i64,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /api/auth/register).
/// Field order matters: validation reports the first failing field.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// LoginRequest
///
/// Input payload for POST /api/auth/login. The identifier resolves by email
/// or username; failures never reveal which part was wrong.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// CreateCourseRequest
///
/// Input payload for submitting a new course (POST /api/courses).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Link is required"))]
    pub link: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub description: String,
}

/// UpdateCourseRequest
///
/// Partial update payload for modifying an existing course (PUT /api/courses/{id}).
///
/// Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// so only provided fields are included in the JSON payload; unset fields keep
/// their current value (COALESCE at the repository layer).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// UpdateRoleRequest
///
/// Input payload for the admin role-change endpoint
/// (PUT /api/admin/users/{id}/role). The role arrives as a raw string and is
/// parsed against the enumerated set; anything outside it is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// --- Response Schemas (Output) ---

/// AuthResponse
///
/// Output of both registration and login: the signed identity assertion.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
}

/// CourseListResponse
///
/// Paginated course listing. `total_pages` is `ceil(total_courses / limit)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CourseListResponse {
    pub courses: Vec<Course>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_courses: i64,
}

/// ProfileResponse
///
/// Output schema for the authenticated user's profile (GET /api/users/me):
/// the fresh user record plus every course they currently own.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub courses: Vec<Course>,
}
