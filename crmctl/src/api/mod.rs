//! Typed wrappers over the backend's REST surface.
//!
//! Endpoints are thin: each function maps one HTTP call onto the shared
//! [`Transport`](crate::transport::Transport) and the serde models in
//! [`models`]. All filtering and pagination happens client-side in
//! [`list`](crate::list), so list endpoints fetch whole collections.

pub mod endpoints;
pub mod models;
