use serde::{Deserialize, Serialize};

/// Deployment status reported by the upstream for a successful deployment.
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Flattened view of a service and the latest deployment of its first instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatusRecord {
    pub project_id: String,
    pub project_name: String,
    pub service_id: String,
    pub service_name: String,
    pub deployment_id: String,
    pub status: String,
    pub static_url: Option<String>,
    pub deployment_stopped: bool,
}

impl ServiceStatusRecord {
    pub fn is_succeeded(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// One flattened page of the upstream project listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    // Number of projects on the page, including those that produced no records.
    pub project_count: usize,
    pub records: Vec<ServiceStatusRecord>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}
