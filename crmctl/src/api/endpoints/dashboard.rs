//! Dashboard endpoint.

use crate::api::models::dashboard::DashboardMetrics;
use crate::errors::Result;
use crate::transport::Transport;

pub async fn metrics(transport: &Transport) -> Result<DashboardMetrics> {
    transport.get("/dashboard").await
}
