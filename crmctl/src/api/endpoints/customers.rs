//! Customer endpoints.

use crate::api::models::customers::{Customer, CustomerCreate, Status};
use crate::errors::Result;
use crate::transport::Transport;
use crate::types::CustomerId;

/// Fetch the whole customer collection.
pub async fn list(transport: &Transport) -> Result<Vec<Customer>> {
    transport.get("/customers").await
}

pub async fn create(transport: &Transport, customer: &CustomerCreate) -> Result<Customer> {
    transport.post("/customers", customer).await
}

pub async fn update(transport: &Transport, id: CustomerId, customer: &CustomerCreate) -> Result<Customer> {
    transport.put(&format!("/customers/{id}"), customer).await
}

pub async fn delete(transport: &Transport, id: CustomerId) -> Result<()> {
    transport.delete(&format!("/customers/{id}")).await
}

/// Enumerate the customer status values.
pub async fn statuses(transport: &Transport) -> Result<Vec<Status>> {
    transport.get("/statuses").await
}
