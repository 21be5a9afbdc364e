use crate::{models::Role, repository::RepositoryState};

/// The well-known address of the bootstrap administrator account.
pub const ADMIN_EMAIL: &str = "admin@coursehub.dev";
pub const ADMIN_USERNAME: &str = "admin";
// Initial credential only; expected to be rotated after first login.
const ADMIN_INITIAL_PASSWORD: &str = "admin123456";

/// seed_admin_user
///
/// One-time idempotent bootstrap, run at startup once the store connection is
/// up: if no user with the well-known admin email exists, one is created with
/// role `admin` and the fixed initial credential. Subsequent starts find the
/// account and do nothing.
///
/// Seeding failures are logged but never abort startup; the rest of the API
/// works without the admin account, and the next restart retries.
pub async fn seed_admin_user(repo: &RepositoryState) {
    let existing = match repo.get_user_by_email(ADMIN_EMAIL).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("admin seed lookup failed: {:?}", e);
            return;
        }
    };

    if existing.is_some() {
        tracing::debug!("admin user already present, seed skipped");
        return;
    }

    let password_hash = match bcrypt::hash(ADMIN_INITIAL_PASSWORD, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("admin seed hashing failed: {:?}", e);
            return;
        }
    };

    match repo
        .create_user(ADMIN_USERNAME, ADMIN_EMAIL, &password_hash, Role::Admin)
        .await
    {
        Ok(_) => tracing::info!("Admin user has been created successfully."),
        Err(e) => tracing::error!("Error seeding admin user: {:?}", e),
    }
}
