//! Access gate: decides whether a screen may be rendered for a user.

use crate::models::{Capability, User};

/// Rendering decision for one screen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nobody is logged in.
    RedirectToLogin,
    /// Show the requested screen.
    Render,
    /// Logged in, but lacking the capability.
    Deny,
}

/// Decide access to `screen` requiring `required`.
///
/// Order matters: an absent user redirects, an admin renders without any
/// permission lookup, and everyone else is default-deny on their permission
/// map.
pub fn decide(user: Option<&User>, screen: &str, required: Capability) -> Outcome {
    let Some(user) = user else {
        return Outcome::RedirectToLogin;
    };

    if user.is_admin() {
        return Outcome::Render;
    }

    if user.permissions.get(screen).allows(required) {
        Outcome::Render
    } else {
        Outcome::Deny
    }
}

/// [`decide`] with the default `read` capability.
pub fn decide_read(user: Option<&User>, screen: &str) -> Outcome {
    decide(user, screen, Capability::Read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capabilities, PermissionMap, Role};

    fn user(role: Role, permissions: PermissionMap) -> User {
        User {
            id: "u1".to_string(),
            name: "Test".to_string(),
            email: "test@club.test".to_string(),
            role,
            permissions,
        }
    }

    #[test]
    fn admin_bypasses_empty_permissions() {
        let admin = user(Role::Admin, PermissionMap::new());
        assert_eq!(
            decide(Some(&admin), "payments", Capability::Manage),
            Outcome::Render
        );
    }

    #[test]
    fn admin_bypasses_explicit_denial() {
        let admin = user(
            Role::Admin,
            PermissionMap::new().grant("settings", Capabilities::NONE),
        );
        assert_eq!(
            decide(Some(&admin), "settings", Capability::Write),
            Outcome::Render
        );
    }

    #[test]
    fn member_without_entry_is_denied() {
        let member = user(Role::Member, PermissionMap::new());
        assert_eq!(decide_read(Some(&member), "members"), Outcome::Deny);
    }

    #[test]
    fn member_gets_only_granted_capabilities() {
        let member = user(
            Role::Member,
            PermissionMap::new().grant("members", Capabilities::READ_ONLY),
        );
        assert_eq!(
            decide(Some(&member), "members", Capability::Write),
            Outcome::Deny
        );
        assert_eq!(
            decide(Some(&member), "members", Capability::Read),
            Outcome::Render
        );
        assert_eq!(
            decide(Some(&member), "members", Capability::Manage),
            Outcome::Deny
        );
    }

    #[test]
    fn unknown_role_uses_permission_map() {
        let other = user(
            Role::Unknown,
            PermissionMap::new().grant("goals", Capabilities::ALL),
        );
        assert_eq!(decide_read(Some(&other), "goals"), Outcome::Render);
        assert_eq!(decide_read(Some(&other), "payments"), Outcome::Deny);
    }

    #[test]
    fn missing_user_redirects() {
        assert_eq!(decide_read(None, "dashboard"), Outcome::RedirectToLogin);
        assert_eq!(
            decide(None, "payments", Capability::Manage),
            Outcome::RedirectToLogin
        );
    }
}
