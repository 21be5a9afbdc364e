/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// enforcing a Defense-in-Depth strategy. This structure ensures that
/// access control is applied explicitly at the module level (via Axum layers),
/// preventing accidental exposure of protected endpoints.
///
/// The three modules map directly to the defined access tiers.

/// Routes accessible to all users (anonymous, read-only, plus the auth gateway).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated identity token.
pub mod authenticated;

/// Routes restricted exclusively to users whose **current** role is 'admin'.
/// The role check runs inside the handlers against a fresh store read.
pub mod admin;
