use crate::models::{
    Course, CreateCourseRequest, PublicUser, Role, TopContributor, UpdateCourseRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the
/// core of the Repository Abstraction pattern, allowing the handlers to
/// interact with the data layer without knowing the specific implementation
/// (Postgres, Mock, etc.).
///
/// Every method returns `Result`; store failures propagate up to the handler
/// layer, where they collapse into a generic 500. Nothing is retried.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User Retrieval ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    // Login resolution: matches either the email or the username column.
    async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, sqlx::Error>;

    // --- User Actions ---
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error>;
    // Admin panel listing: every user, newest first, without credential hashes.
    async fn list_users(&self) -> Result<Vec<PublicUser>, sqlx::Error>;
    // Returns None if the target user does not exist.
    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<Option<PublicUser>, sqlx::Error>;
    // Atomic single-row counter move; clamps at zero so no interleaving of
    // deletes can drive the counter negative.
    async fn adjust_contribution_count(&self, id: Uuid, delta: i64) -> Result<(), sqlx::Error>;
    // Leaderboard: strictly positive counters only, descending.
    async fn top_contributors(&self, limit: i64) -> Result<Vec<TopContributor>, sqlx::Error>;

    // --- Course Retrieval ---
    async fn list_courses(&self, offset: i64, limit: i64) -> Result<Vec<Course>, sqlx::Error>;
    async fn count_courses(&self) -> Result<i64, sqlx::Error>;
    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, sqlx::Error>;
    async fn get_courses_by_author(&self, author_id: Uuid) -> Result<Vec<Course>, sqlx::Error>;

    // --- Course Actions ---
    // Ownership is fixed at creation: author_id never changes afterwards.
    async fn create_course(
        &self,
        req: CreateCourseRequest,
        author_id: Uuid,
        author_name: &str,
    ) -> Result<Course, sqlx::Error>;
    // Partial update via COALESCE; no ownership filter here. The caller is
    // responsible for running the authorization policy first.
    async fn update_course(
        &self,
        id: Uuid,
        req: UpdateCourseRequest,
    ) -> Result<Option<Course>, sqlx::Error>;
    // True if a row was actually removed.
    async fn delete_course(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, contribution_count, created_at, updated_at";

const PUBLIC_USER_COLUMNS: &str =
    "id, username, email, role, contribution_count, created_at, updated_at";

const COURSE_COLUMNS: &str =
    "id, title, link, category, description, author_id, author_name, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// get_user_by_identifier
    ///
    /// Single lookup backing the login flow: the identifier may be either the
    /// account email or the username.
    async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_user
    ///
    /// Inserts a new user record. The contribution counter always starts at
    /// zero; uniqueness of email and username is enforced by the table's
    /// unique indexes as a second line behind the handler's duplicate checks.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash, role, contribution_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            "SELECT {PUBLIC_USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PUBLIC_USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    /// adjust_contribution_count
    ///
    /// One atomic UPDATE. GREATEST keeps the counter at zero or above even if
    /// deletes interleave; there is deliberately no read-modify-write cycle
    /// in process.
    async fn adjust_contribution_count(&self, id: Uuid, delta: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET contribution_count = GREATEST(contribution_count + $2, 0), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn top_contributors(&self, limit: i64) -> Result<Vec<TopContributor>, sqlx::Error> {
        sqlx::query_as::<_, TopContributor>(
            "SELECT username, contribution_count FROM users \
             WHERE contribution_count > 0 \
             ORDER BY contribution_count DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// list_courses
    ///
    /// Pagination window over the full course set, newest first.
    async fn list_courses(&self, offset: i64, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_courses(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_courses_by_author(&self, author_id: Uuid) -> Result<Vec<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE author_id = $1 ORDER BY created_at DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
    }

    /// create_course
    ///
    /// Inserts a new course with the author reference and the denormalized
    /// display name captured at write time.
    async fn create_course(
        &self,
        req: CreateCourseRequest,
        author_id: Uuid,
        author_name: &str,
    ) -> Result<Course, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (id, title, link, category, description, author_id, author_name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.link)
        .bind(req.category)
        .bind(req.description)
        .bind(author_id)
        .bind(author_name)
        .fetch_one(&self.pool)
        .await
    }

    /// update_course
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column if the corresponding field in `req` is `Some`.
    async fn update_course(
        &self,
        id: Uuid,
        req: UpdateCourseRequest,
    ) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses \
             SET title = COALESCE($2, title), \
                 link = COALESCE($3, link), \
                 category = COALESCE($4, category), \
                 description = COALESCE($5, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.link)
        .bind(req.category)
        .bind(req.description)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
