//! Role endpoints.

use crate::api::models::roles::{Role, RoleCreate};
use crate::errors::Result;
use crate::transport::Transport;
use crate::types::RoleId;

/// Fetch all roles, including their permission sets.
pub async fn list(transport: &Transport) -> Result<Vec<Role>> {
    transport.get("/roles").await
}

pub async fn create(transport: &Transport, role: &RoleCreate) -> Result<Role> {
    transport.post("/roles", role).await
}

pub async fn update(transport: &Transport, id: RoleId, role: &RoleCreate) -> Result<Role> {
    transport.put(&format!("/roles/{id}"), role).await
}

pub async fn delete(transport: &Transport, id: RoleId) -> Result<()> {
    transport.delete(&format!("/roles/{id}")).await
}
