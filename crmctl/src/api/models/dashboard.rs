//! API models for the dashboard aggregate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate metrics served by `GET /dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub customer_count: i64,
    pub user_count: i64,
    pub role_count: i64,
    /// Customer count per status value
    #[serde(default)]
    pub status_distribution: HashMap<String, i64>,
}
