use crate::{
    AppState,
    auth::{AuthUser, issue_token},
    errors::ApiError,
    models::{
        AuthResponse, Course, CourseListResponse, CreateCourseRequest, LoginRequest,
        ProfileResponse, PublicUser, RegisterRequest, Role, TopContributor, UpdateCourseRequest,
        UpdateRoleRequest, User,
    },
    policy::{self, MutationDecision, RoleChangeRejection},
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// How many users the public leaderboard returns.
const LEADERBOARD_SIZE: i64 = 5;

// --- Filter Structs ---

/// CourseListQuery
///
/// Accepted query parameters for the public course listing endpoint
/// (GET /api/courses). Both are optional; defaults are page=1, limit=10.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CourseListQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Courses per page (clamped to 1..=100).
    pub limit: Option<i64>,
}

// --- Shared Helpers ---

/// Reports the first failing field, walking fields in their declared order.
/// The validator crate collects failures per field in an unordered map, so
/// the caller passes the declaration order explicitly.
fn first_validation_error(errors: &ValidationErrors, field_order: &[&str]) -> ApiError {
    let by_field = errors.field_errors();
    for &field in field_order {
        if let Some(list) = by_field.get(field) {
            if let Some(err) = list.first() {
                let msg = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"));
                return ApiError::Validation(msg);
            }
        }
    }
    ApiError::Validation("Invalid request".to_string())
}

/// Resolves the acting identity's **current** record from the store. The
/// token only proves who the caller was at login; anything that depends on
/// the present role starts here.
async fn load_current_user(repo: &RepositoryState, id: Uuid) -> Result<User, ApiError> {
    repo.get_user(id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("User no longer exists".to_string()))
}

/// Admin gate for the user-management panel, checked against the persisted
/// role rather than the token snapshot.
async fn require_admin(repo: &RepositoryState, id: Uuid) -> Result<User, ApiError> {
    let user = load_current_user(repo, id).await?;
    if user.role != Role::Admin {
        return Err(ApiError::Unauthorized("Admin access required".to_string()));
    }
    Ok(user)
}

/// Resolves a course's author at mutation time. A dangling reference means
/// the ownership invariant is broken, which is a server fault, not a client
/// one.
async fn load_course_author(repo: &RepositoryState, course: &Course) -> Result<User, ApiError> {
    repo.get_user(course.author_id).await?.ok_or_else(|| {
        ApiError::Internal(format!(
            "course {} references missing author {}",
            course.id, course.author_id
        ))
    })
}

// --- Auth Handlers ---

/// register
///
/// [Public Route] Creates a new account and mints its first identity token.
///
/// *Uniqueness*: email and username are both checked before insertion; a
/// clash rejects the request and persists nothing.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failure or identity already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if let Err(errors) = payload.validate() {
        return Err(first_validation_error(
            &errors,
            &["username", "email", "password"],
        ));
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if state.repo.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::DuplicateIdentity(
            "Email already in use".to_string(),
        ));
    }
    if state.repo.get_user_by_username(&username).await?.is_some() {
        return Err(ApiError::DuplicateIdentity(
            "Username already taken".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user = state
        .repo
        .create_user(&username, &email, &password_hash, Role::User)
        .await?;

    let token = issue_token(user.id, &user.username, user.role, &state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

    Ok(Json(AuthResponse { token }))
}

/// login
///
/// [Public Route] Authenticates by email-or-username plus password.
///
/// *Enumeration safety*: an unknown identifier and a wrong password produce
/// the identical "Invalid credentials" response, so callers cannot probe for
/// which accounts exist.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if let Err(errors) = payload.validate() {
        return Err(first_validation_error(&errors, &["identifier", "password"]));
    }

    let user = state
        .repo
        .get_user_by_identifier(payload.identifier.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let matches = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(user.id, &user.username, user.role, &state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

    Ok(Json(AuthResponse { token }))
}

// --- Course Handlers ---

/// list_courses
///
/// [Public Route] Paginated course listing, newest first. Returns the page
/// of courses plus total-page bookkeeping for the client's pager.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    responses((status = 200, description = "Paginated courses", body = CourseListResponse))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let courses = state.repo.list_courses(offset, limit).await?;
    let total_courses = state.repo.count_courses().await?;
    let total_pages = (total_courses + limit - 1) / limit;

    Ok(Json(CourseListResponse {
        courses,
        current_page: page,
        total_pages,
        total_courses,
    }))
}

/// get_course
///
/// [Public Route] Retrieves a single course by ID.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = Course),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
    match state.repo.get_course(id).await? {
        Some(course) => Ok(Json(course)),
        None => Err(ApiError::NotFound("Course not found".to_string())),
    }
}

/// create_course
///
/// [Authenticated Route] Submits a new course. The author reference comes
/// from the authenticated session and the display name is denormalized from
/// the token's username at write time. Creation bumps the caller's
/// contribution counter by exactly one.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseRequest,
    responses((status = 200, description = "Created", body = Course))
)]
pub async fn create_course(
    AuthUser { id, username, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<Json<Course>, ApiError> {
    if let Err(errors) = payload.validate() {
        return Err(first_validation_error(&errors, &["title", "link", "category"]));
    }

    let course = state.repo.create_course(payload, id, &username).await?;
    state.repo.adjust_contribution_count(id, 1).await?;

    Ok(Json(course))
}

/// update_course
///
/// [Authenticated Route] Partial update of an existing course.
///
/// *Authorization*: the course, the actor's current record and the author's
/// current record are all loaded fresh, then run through the mutation
/// policy. The token's role snapshot is never trusted here, so a demotion
/// since login takes effect immediately.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 403, description = "Policy denied the mutation"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_course(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .repo
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let actor = load_current_user(&state.repo, actor_id).await?;
    let author = load_course_author(&state.repo, &course).await?;

    if let MutationDecision::Denied(reason) = policy::authorize_course_mutation(&actor, &author) {
        return Err(ApiError::Unauthorized(reason.message().to_string()));
    }

    match state.repo.update_course(id, payload).await? {
        Some(updated) => Ok(Json(updated)),
        // The course vanished between the policy check and the write.
        None => Err(ApiError::NotFound("Course not found".to_string())),
    }
}

/// delete_course
///
/// [Authenticated Route] Deletes a course under the same policy gate as
/// updates, then decrements the **author's** contribution counter by exactly
/// one (clamped at zero at the store).
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Policy denied the mutation"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_course(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let course = state
        .repo
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let actor = load_current_user(&state.repo, actor_id).await?;
    let author = load_course_author(&state.repo, &course).await?;

    if let MutationDecision::Denied(reason) = policy::authorize_course_mutation(&actor, &author) {
        return Err(ApiError::Unauthorized(reason.message().to_string()));
    }

    if !state.repo.delete_course(id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    // The counter follows the course's owner, not the actor: a moderator
    // removing someone's course still decrements that author's count.
    state.repo.adjust_contribution_count(author.id, -1).await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- User Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's fresh profile (sans credential hash)
/// plus every course they currently own, newest first.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let courses = state.repo.get_courses_by_author(id).await?;

    Ok(Json(ProfileResponse {
        user: PublicUser::from(user),
        courses,
    }))
}

/// top_contributors
///
/// [Public Route] Leaderboard of the five most prolific contributors.
/// Users with a zero counter never appear.
#[utoipa::path(
    get,
    path = "/api/users/top-contributors",
    responses((status = 200, description = "Leaderboard", body = [TopContributor]))
)]
pub async fn top_contributors(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopContributor>>, ApiError> {
    let top = state.repo.top_contributors(LEADERBOARD_SIZE).await?;
    Ok(Json(top))
}

// --- Admin Handlers ---

/// list_users
///
/// [Admin Route] Every user in the system, newest first, without credential
/// hashes.
///
/// *Authorization*: the caller's **persisted** role must be admin; the token
/// snapshot alone is not enough.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = [PublicUser]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    require_admin(&state.repo, id).await?;
    Ok(Json(state.repo.list_users().await?))
}

/// update_user_role
///
/// [Admin Route] Changes a user's role to `user` or `moderator`.
///
/// Promotion to admin is not possible through this path, and an existing
/// admin can never be the target (no demotion of the highest tier). Both
/// rules live in `policy::authorize_role_change`.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "Target user ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = PublicUser),
        (status = 400, description = "Invalid role or protected target"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    AuthUser { id: actor_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let actor = require_admin(&state.repo, actor_id).await?;

    let requested =
        Role::try_from(payload.role.as_str()).map_err(|_| ApiError::InvalidRoleValue)?;

    let target = state
        .repo
        .get_user(target_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    policy::authorize_role_change(&actor, &target, requested).map_err(|rejection| {
        match rejection {
            RoleChangeRejection::NotAdmin => {
                ApiError::Unauthorized("Admin access required".to_string())
            }
            RoleChangeRejection::InvalidRole => ApiError::InvalidRoleValue,
            RoleChangeRejection::TargetIsAdmin => ApiError::ProtectedRole,
        }
    })?;

    match state.repo.set_user_role(target_id, requested).await? {
        Some(updated) => Ok(Json(updated)),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
