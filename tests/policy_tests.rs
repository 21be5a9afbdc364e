use course_hub::{
    models::{Role, User},
    policy::{
        AllowReason, DenyReason, MutationDecision, RoleChangeRejection, authorize_course_mutation,
        authorize_role_change,
    },
};
use uuid::Uuid;

// --- Fixtures ---

const ALL_ROLES: [Role; 3] = [Role::User, Role::Moderator, Role::Admin];

fn user_with_role(id: u128, role: Role) -> User {
    User {
        id: Uuid::from_u128(id),
        username: format!("user-{id}"),
        email: format!("user-{id}@example.com"),
        role,
        ..User::default()
    }
}

// --- Course Mutation Decision Matrix ---

#[test]
fn owner_is_always_allowed_regardless_of_roles() {
    for actor_role in ALL_ROLES {
        for author_role in ALL_ROLES {
            let actor = user_with_role(1, actor_role);
            let author = user_with_role(1, author_role);

            assert_eq!(
                authorize_course_mutation(&actor, &author),
                MutationDecision::Allowed(AllowReason::Owner),
                "owner must win for actor={actor_role:?} author={author_role:?}"
            );
        }
    }
}

#[test]
fn admin_is_allowed_over_any_author() {
    for author_role in ALL_ROLES {
        let actor = user_with_role(1, Role::Admin);
        let author = user_with_role(2, author_role);

        let decision = authorize_course_mutation(&actor, &author);
        assert!(decision.is_allowed(), "admin denied over {author_role:?}");
        assert_eq!(decision, MutationDecision::Allowed(AllowReason::Admin));
    }
}

#[test]
fn moderator_is_allowed_over_non_admin_authors() {
    for author_role in [Role::User, Role::Moderator] {
        let actor = user_with_role(1, Role::Moderator);
        let author = user_with_role(2, author_role);

        assert_eq!(
            authorize_course_mutation(&actor, &author),
            MutationDecision::Allowed(AllowReason::ModeratorOverNonAdmin),
        );
    }
}

#[test]
fn moderator_is_denied_over_admin_authors() {
    let actor = user_with_role(1, Role::Moderator);
    let author = user_with_role(2, Role::Admin);

    // The reason code is part of the contract: the middle tier must be told
    // it hit the admin-author protection, not a generic ownership failure.
    assert_eq!(
        authorize_course_mutation(&actor, &author),
        MutationDecision::Denied(DenyReason::AdminAuthorProtected),
    );
}

#[test]
fn regular_user_is_denied_on_foreign_content() {
    for author_role in ALL_ROLES {
        let actor = user_with_role(1, Role::User);
        let author = user_with_role(2, author_role);

        assert_eq!(
            authorize_course_mutation(&actor, &author),
            MutationDecision::Denied(DenyReason::NotOwnerOrElevated),
            "user must be denied over {author_role:?}"
        );
    }
}

#[test]
fn deny_reasons_have_distinct_messages() {
    assert_ne!(
        DenyReason::NotOwnerOrElevated.message(),
        DenyReason::AdminAuthorProtected.message()
    );
}

// --- Role Change Gate ---

#[test]
fn role_change_requires_admin_caller() {
    for actor_role in [Role::User, Role::Moderator] {
        let actor = user_with_role(1, actor_role);
        let target = user_with_role(2, Role::User);

        assert_eq!(
            authorize_role_change(&actor, &target, Role::Moderator),
            Err(RoleChangeRejection::NotAdmin),
        );
    }
}

#[test]
fn role_change_never_promotes_to_admin() {
    let actor = user_with_role(1, Role::Admin);
    let target = user_with_role(2, Role::User);

    assert_eq!(
        authorize_role_change(&actor, &target, Role::Admin),
        Err(RoleChangeRejection::InvalidRole),
    );
}

#[test]
fn role_change_protects_admin_targets() {
    let actor = user_with_role(1, Role::Admin);
    let target = user_with_role(2, Role::Admin);

    for requested in [Role::User, Role::Moderator] {
        assert_eq!(
            authorize_role_change(&actor, &target, requested),
            Err(RoleChangeRejection::TargetIsAdmin),
        );
    }
}

#[test]
fn role_change_allows_admin_to_move_between_user_and_moderator() {
    let actor = user_with_role(1, Role::Admin);

    let member = user_with_role(2, Role::User);
    assert_eq!(authorize_role_change(&actor, &member, Role::Moderator), Ok(()));

    let moderator = user_with_role(3, Role::Moderator);
    assert_eq!(authorize_role_change(&actor, &moderator, Role::User), Ok(()));
}

#[test]
fn non_admin_caller_is_rejected_before_the_requested_role_is_inspected() {
    // A moderator asking for an admin promotion must hit the caller check
    // first; the rejection is about who is asking, not what was asked for.
    let actor = user_with_role(1, Role::Moderator);
    let target = user_with_role(2, Role::User);

    assert_eq!(
        authorize_role_change(&actor, &target, Role::Admin),
        Err(RoleChangeRejection::NotAdmin),
    );
}
