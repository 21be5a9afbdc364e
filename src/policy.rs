use crate::models::{Role, User};

/// Authorization Policy
///
/// Decides, for a mutating action on a course, whether the acting identity
/// may proceed given the **current** persisted roles of both the actor and
/// the course's author. Callers look both records up fresh per request;
/// nothing here is derived from token snapshots, and no decision is cached.
///
/// The rules:
/// - owners always retain control of their own content;
/// - admins have unrestricted mutation rights;
/// - moderators may moderate any non-admin-authored content, but may not
///   override an admin's content. This keeps the highest trust tier out of
///   reach of the middle one.
///
/// Decisions carry an explicit reason code rather than a bare boolean, so
/// callers (and tests) can see *why* an action was allowed or denied.

/// MutationDecision
///
/// Outcome of [`authorize_course_mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDecision {
    Allowed(AllowReason),
    Denied(DenyReason),
}

/// AllowReason
///
/// Which rule granted the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The actor owns the course.
    Owner,
    /// The actor holds the admin role.
    Admin,
    /// The actor is a moderator and the author is not an admin.
    ModeratorOverNonAdmin,
}

/// DenyReason
///
/// Which rule blocked the mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// A regular user touching content they do not own, or a moderator
    /// denied for the same reason after the admin-author check.
    NotOwnerOrElevated,
    /// A moderator attempting to override admin-authored content.
    AdminAuthorProtected,
}

impl MutationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, MutationDecision::Allowed(_))
    }
}

impl DenyReason {
    /// The human-readable message surfaced in the 403 response body.
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotOwnerOrElevated => "Not authorized to modify this course",
            DenyReason::AdminAuthorProtected => "Moderators cannot modify an admin's course",
        }
    }
}

/// authorize_course_mutation
///
/// `allow = owner OR admin OR (moderator AND author is not admin)`, with the
/// winning (or blocking) rule named in the result.
pub fn authorize_course_mutation(actor: &User, author: &User) -> MutationDecision {
    if actor.id == author.id {
        return MutationDecision::Allowed(AllowReason::Owner);
    }
    if actor.role == Role::Admin {
        return MutationDecision::Allowed(AllowReason::Admin);
    }
    if actor.role == Role::Moderator {
        return if author.role == Role::Admin {
            MutationDecision::Denied(DenyReason::AdminAuthorProtected)
        } else {
            MutationDecision::Allowed(AllowReason::ModeratorOverNonAdmin)
        };
    }
    MutationDecision::Denied(DenyReason::NotOwnerOrElevated)
}

/// RoleChangeRejection
///
/// Why a role-change request was refused. Mapped onto the error taxonomy at
/// the handler layer (`Unauthorized`, `InvalidRoleValue`, `ProtectedRole`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChangeRejection {
    /// The caller's current role is not admin.
    NotAdmin,
    /// The requested role is outside the assignable set. Promotion to admin
    /// is never available through this path; admin is bootstrap-only.
    InvalidRole,
    /// The target currently holds the admin role; admins cannot be demoted.
    TargetIsAdmin,
}

/// authorize_role_change
///
/// Gate for the admin role-change endpoint. `actor` and `target` are the
/// current persisted records, looked up fresh; `requested` is the already
/// parsed role from the request body.
pub fn authorize_role_change(
    actor: &User,
    target: &User,
    requested: Role,
) -> Result<(), RoleChangeRejection> {
    if actor.role != Role::Admin {
        return Err(RoleChangeRejection::NotAdmin);
    }
    if requested == Role::Admin {
        return Err(RoleChangeRejection::InvalidRole);
    }
    if target.role == Role::Admin {
        return Err(RoleChangeRejection::TargetIsAdmin);
    }
    Ok(())
}
