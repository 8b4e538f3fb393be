//! Access policy evaluation.
//!
//! Pure decision functions over a principal view and a media item's
//! ownership/visibility data. No state, no I/O; callers evaluate the same
//! rules everywhere instead of re-deriving them per endpoint.

use uuid::Uuid;

use crate::models::{Actor, MediaAccess, Role};

/// Errors raised by the requirement-style checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The actor's role is not in the allowed set.
    RoleNotAllowed { actual: Role },
    /// The actor neither owns the resource nor holds the admin role.
    NotOwnerOrAdmin,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::RoleNotAllowed { actual } => {
                write!(f, "Role '{}' is not permitted for this action", actual.as_str())
            }
            PolicyError::NotOwnerOrAdmin => {
                write!(f, "Only the owner or an administrator may do this")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

impl From<PolicyError> for gallery_core::error::AppError {
    fn from(err: PolicyError) -> Self {
        gallery_core::error::AppError::Forbidden(anyhow::anyhow!(err.to_string()))
    }
}

/// Access policy evaluator.
#[derive(Debug, Clone)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// An item is viewable by its owner, any admin, anyone it is shared
    /// with, and everyone when it is public.
    pub fn can_view(actor: &Actor, media: &MediaAccess) -> bool {
        actor.user_id == media.owner_id
            || actor.role == Role::Admin
            || media.is_shared_with(actor.user_id)
            || media.is_public()
    }

    /// An item is mutable only by its owner or an admin. Sharing grants
    /// visibility, never mutation.
    pub fn can_mutate(actor: &Actor, media: &MediaAccess) -> bool {
        actor.user_id == media.owner_id || actor.role == Role::Admin
    }

    /// Require the actor's role to be in `allowed`.
    pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), PolicyError> {
        if allowed.contains(&actor.role) {
            Ok(())
        } else {
            Err(PolicyError::RoleNotAllowed { actual: actor.role })
        }
    }

    /// Require the actor to own the resource or hold the admin role.
    pub fn require_owner_or_admin(actor: &Actor, owner_id: Uuid) -> Result<(), PolicyError> {
        if actor.user_id == owner_id || actor.role == Role::Admin {
            Ok(())
        } else {
            Err(PolicyError::NotOwnerOrAdmin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_owner_can_view_and_mutate_private_item() {
        let owner = actor(Role::User);
        let media = MediaAccess::new(owner.user_id, Visibility::Private);

        assert!(AccessPolicy::can_view(&owner, &media));
        assert!(AccessPolicy::can_mutate(&owner, &media));
    }

    #[test]
    fn test_admin_can_view_and_mutate_any_item() {
        let admin = actor(Role::Admin);
        let media = MediaAccess::new(Uuid::new_v4(), Visibility::Private);

        assert!(AccessPolicy::can_view(&admin, &media));
        assert!(AccessPolicy::can_mutate(&admin, &media));
    }

    #[test]
    fn test_stranger_sees_only_public_items() {
        let stranger = actor(Role::User);
        let private_item = MediaAccess::new(Uuid::new_v4(), Visibility::Private);
        let public_item = MediaAccess::new(Uuid::new_v4(), Visibility::Public);

        assert!(!AccessPolicy::can_view(&stranger, &private_item));
        assert!(AccessPolicy::can_view(&stranger, &public_item));
    }

    #[test]
    fn test_shared_user_can_view_private_item() {
        let viewer = actor(Role::User);
        let media = MediaAccess::with_shares(
            Uuid::new_v4(),
            Visibility::Private,
            vec![Uuid::new_v4(), viewer.user_id],
        );

        assert!(AccessPolicy::can_view(&viewer, &media));
    }

    #[test]
    fn test_sharing_never_grants_mutation() {
        let viewer = actor(Role::User);
        let media =
            MediaAccess::with_shares(Uuid::new_v4(), Visibility::Public, vec![viewer.user_id]);

        assert!(AccessPolicy::can_view(&viewer, &media));
        assert!(!AccessPolicy::can_mutate(&viewer, &media));
    }

    #[test]
    fn test_public_visibility_never_grants_mutation() {
        let stranger = actor(Role::User);
        let media = MediaAccess::new(Uuid::new_v4(), Visibility::Public);

        assert!(!AccessPolicy::can_mutate(&stranger, &media));
    }

    #[test]
    fn test_require_role() {
        let user = actor(Role::User);
        let admin = actor(Role::Admin);

        assert!(AccessPolicy::require_role(&admin, &[Role::Admin]).is_ok());
        assert!(AccessPolicy::require_role(&user, &[Role::User, Role::Admin]).is_ok());
        assert_eq!(
            AccessPolicy::require_role(&user, &[Role::Admin]),
            Err(PolicyError::RoleNotAllowed { actual: Role::User })
        );
    }

    #[test]
    fn test_require_owner_or_admin() {
        let owner = actor(Role::User);
        let admin = actor(Role::Admin);
        let stranger = actor(Role::User);

        assert!(AccessPolicy::require_owner_or_admin(&owner, owner.user_id).is_ok());
        assert!(AccessPolicy::require_owner_or_admin(&admin, owner.user_id).is_ok());
        assert_eq!(
            AccessPolicy::require_owner_or_admin(&stranger, owner.user_id),
            Err(PolicyError::NotOwnerOrAdmin)
        );
    }
}
