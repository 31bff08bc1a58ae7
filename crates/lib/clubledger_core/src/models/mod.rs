//! Domain models shared by the session, access and navigation layers.

pub mod auth;
pub mod member;

pub use auth::{Capabilities, Capability, PermissionMap, Role, User};
pub use member::Member;
