//! Common type definitions shared across the crate.
//!
//! The backend exposes json-server style numeric IDs, so entity IDs are
//! plain integers rather than UUIDs. Permissions are opaque string
//! capability tags attached to roles and routes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// Type aliases for IDs
pub type CustomerId = i64;
pub type UserId = i64;
pub type RoleId = i64;

/// An opaque capability tag gating access to a route or action.
///
/// Permissions are compared verbatim; the client attaches no meaning to the
/// string beyond equality (e.g. `customer:view`, `user:manage`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

/// The authorization capability set resolved for a session's role.
pub type PermissionSet = HashSet<Permission>;
