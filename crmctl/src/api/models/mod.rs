//! Request/response models for the backend API.

pub mod customers;
pub mod dashboard;
pub mod roles;
pub mod users;
