//! Screen registry and navigation.
//!
//! Maps a requested path to the view the shell should show, consulting the
//! access gate for every screen except the login page.

use std::fmt;

use crate::access::{self, Outcome};
use crate::models::{Capability, User};

/// Navigable screens. The name is the permission-map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Members,
    Payments,
    Dividends,
    Goals,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Members,
        Screen::Payments,
        Screen::Dividends,
        Screen::Goals,
        Screen::Settings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Members => "members",
            Self::Payments => "payments",
            Self::Dividends => "dividends",
            Self::Goals => "goals",
            Self::Settings => "settings",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Members => "/members",
            Self::Payments => "/payments",
            Self::Dividends => "/dividends",
            Self::Goals => "/goals",
            Self::Settings => "/settings",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Screen(Screen),
}

/// What the shell renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Page(Screen),
    Unauthorized(Screen),
    NotFound(String),
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Page(screen) => write!(f, "page {screen}"),
            Self::Unauthorized(screen) => write!(f, "not authorized: {screen}"),
            Self::NotFound(path) => write!(f, "not found: {path}"),
        }
    }
}

/// Resolve a path. A trailing `/` is ignored and `/dashboard` aliases `/`.
pub fn resolve(path: &str) -> Option<Route> {
    let trimmed = path.trim();
    let normalized = match trimmed.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    if normalized == LOGIN_PATH {
        return Some(Route::Login);
    }
    if normalized == "/dashboard" {
        return Some(Route::Screen(Screen::Dashboard));
    }
    Screen::ALL
        .into_iter()
        .find(|s| s.path() == normalized)
        .map(Route::Screen)
}

/// Decide the view for `path`.
pub fn navigate(user: Option<&User>, path: &str, required: Capability) -> View {
    let screen = match resolve(path) {
        None => return View::NotFound(path.to_string()),
        Some(Route::Login) => return View::Login,
        Some(Route::Screen(screen)) => screen,
    };

    match access::decide(user, screen.name(), required) {
        Outcome::RedirectToLogin => View::Login,
        Outcome::Deny => View::Unauthorized(screen),
        Outcome::Render => View::Page(screen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capabilities, PermissionMap, Role};

    fn member() -> User {
        User {
            id: "u1".to_string(),
            name: "Member".to_string(),
            email: "m@club.test".to_string(),
            role: Role::Member,
            permissions: PermissionMap::new()
                .grant("members", Capabilities::READ_ONLY)
                .grant("dashboard", Capabilities::READ_ONLY),
        }
    }

    #[test]
    fn resolves_known_paths() {
        assert_eq!(resolve("/"), Some(Route::Screen(Screen::Dashboard)));
        assert_eq!(resolve(""), Some(Route::Screen(Screen::Dashboard)));
        assert_eq!(resolve("/dashboard/"), Some(Route::Screen(Screen::Dashboard)));
        assert_eq!(resolve("/payments/"), Some(Route::Screen(Screen::Payments)));
        assert_eq!(resolve("/login"), Some(Route::Login));
        assert_eq!(resolve("/reports"), None);
    }

    #[test]
    fn every_screen_path_round_trips() {
        for screen in Screen::ALL {
            assert_eq!(resolve(screen.path()), Some(Route::Screen(screen)));
        }
    }

    #[test]
    fn anonymous_user_is_sent_to_login() {
        assert_eq!(navigate(None, "/members", Capability::Read), View::Login);
    }

    #[test]
    fn login_page_is_always_reachable() {
        assert_eq!(navigate(None, "/login", Capability::Manage), View::Login);
        assert_eq!(
            navigate(Some(&member()), "/login", Capability::Read),
            View::Login
        );
    }

    #[test]
    fn unknown_path_is_not_found_even_when_anonymous() {
        assert_eq!(
            navigate(None, "/nowhere", Capability::Read),
            View::NotFound("/nowhere".to_string())
        );
    }

    #[test]
    fn member_views_follow_permissions() {
        let user = member();
        assert_eq!(
            navigate(Some(&user), "/members", Capability::Read),
            View::Page(Screen::Members)
        );
        assert_eq!(
            navigate(Some(&user), "/members", Capability::Write),
            View::Unauthorized(Screen::Members)
        );
        assert_eq!(
            navigate(Some(&user), "/settings", Capability::Read),
            View::Unauthorized(Screen::Settings)
        );
    }
}
