//! User endpoints.

use crate::api::models::users::{User, UserCreate};
use crate::errors::Result;
use crate::transport::Transport;
use crate::types::UserId;

/// Credential lookup for login: every record whose username matches.
pub async fn find_by_username(transport: &Transport, username: &str) -> Result<Vec<User>> {
    transport.get_query("/users", &[("username", username)]).await
}

pub async fn list(transport: &Transport) -> Result<Vec<User>> {
    transport.get("/users").await
}

/// Register a new user.
pub async fn register(transport: &Transport, user: &UserCreate) -> Result<User> {
    transport.post("/users", user).await
}

pub async fn update(transport: &Transport, id: UserId, user: &UserCreate) -> Result<User> {
    transport.put(&format!("/users/{id}"), user).await
}

pub async fn delete(transport: &Transport, id: UserId) -> Result<()> {
    transport.delete(&format!("/users/{id}")).await
}
