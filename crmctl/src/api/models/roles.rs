//! API models for roles.

use crate::types::{Permission, RoleId};
use serde::{Deserialize, Serialize};

/// A role record: a code users reference plus its permission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    /// Code stored on user records (e.g. "admin")
    pub code: String,
    /// Display name (e.g. "Administrator")
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Payload for `POST /roles` and `PUT /roles/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}
