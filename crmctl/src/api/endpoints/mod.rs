//! One module per backend resource.

pub mod customers;
pub mod dashboard;
pub mod roles;
pub mod users;
