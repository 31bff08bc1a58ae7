//! Identity and permission models.
//!
//! `User` serializes to the same camelCase JSON that is persisted under the
//! `currentUser` session key, so a stored record round-trips unchanged.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Club role. Only `admin` and `member` are issued by the identity roster;
/// anything else deserializes to `Unknown` and is never treated as admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single capability on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    #[default]
    Read,
    Write,
    Manage,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a capability name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability: {0}")]
pub struct ParseCapabilityError(pub String);

impl FromStr for Capability {
    type Err = ParseCapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "manage" => Ok(Self::Manage),
            _ => Err(ParseCapabilityError(s.to_string())),
        }
    }
}

/// Capability record for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub manage: bool,
}

impl Capabilities {
    /// The zero value: nothing allowed.
    pub const NONE: Self = Self {
        read: false,
        write: false,
        manage: false,
    };

    pub const ALL: Self = Self {
        read: true,
        write: true,
        manage: true,
    };

    pub const READ_ONLY: Self = Self {
        read: true,
        write: false,
        manage: false,
    };

    /// Whether this record grants `capability`.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.read,
            Capability::Write => self.write,
            Capability::Manage => self.manage,
        }
    }
}

/// Screen name → capabilities.
///
/// Lookups are total: a screen with no entry yields [`Capabilities::NONE`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(HashMap<String, Capabilities>);

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities granted on `screen`, default-deny.
    pub fn get(&self, screen: &str) -> Capabilities {
        self.0.get(screen).copied().unwrap_or(Capabilities::NONE)
    }

    pub fn grant(mut self, screen: impl Into<String>, capabilities: Capabilities) -> Self {
        self.0.insert(screen.into(), capabilities);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Capabilities)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (String, Capabilities)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Authenticated club user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "nullable_permissions")]
    pub permissions: PermissionMap,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Accept `"permissions": null` as an empty map.
fn nullable_permissions<'de, D>(deserializer: D) -> Result<PermissionMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PermissionMap>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_screen_is_default_deny() {
        let map = PermissionMap::new().grant("members", Capabilities::READ_ONLY);
        assert_eq!(map.get("payments"), Capabilities::NONE);
        assert!(map.get("members").allows(Capability::Read));
        assert!(!map.get("members").allows(Capability::Write));
    }

    #[test]
    fn collected_map_is_default_deny_outside_its_entries() {
        let map: PermissionMap = [("goals".to_string(), Capabilities::ALL)]
            .into_iter()
            .collect();
        assert!(map.get("goals").allows(Capability::Manage));
        assert_eq!(map.get("settings"), Capabilities::NONE);
    }

    #[test]
    fn capability_parses_case_insensitively() {
        assert_eq!("Manage".parse::<Capability>(), Ok(Capability::Manage));
        assert_eq!(" write ".parse::<Capability>(), Ok(Capability::Write));
        assert!("delete".parse::<Capability>().is_err());
    }

    #[test]
    fn user_parses_without_permissions() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "name": "Ada",
            "email": "ada@club.test",
            "role": "admin"
        }))
        .unwrap();
        assert!(user.is_admin());
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn null_permissions_are_empty() {
        let user: User = serde_json::from_value(json!({
            "id": "u2",
            "name": "Bo",
            "email": "bo@club.test",
            "role": "member",
            "permissions": null
        }))
        .unwrap();
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn unrecognised_role_is_not_admin() {
        let user: User = serde_json::from_value(json!({
            "id": "u3",
            "name": "Cy",
            "email": "cy@club.test",
            "role": "treasurer"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Unknown);
        assert!(!user.is_admin());
    }

    #[test]
    fn partial_capability_record_defaults_missing_flags() {
        let map: PermissionMap = serde_json::from_value(json!({
            "payments": { "read": true }
        }))
        .unwrap();
        let caps = map.get("payments");
        assert!(caps.read);
        assert!(!caps.write);
        assert!(!caps.manage);
    }
}
