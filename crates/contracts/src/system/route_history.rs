use serde::{Deserialize, Serialize};

pub const DEFERRED_INSERT_METHOD: &str =
    "frappe.desk.doctype.route_history.route_history.deferred_insert";

/// One visited route queued for server-side history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteHistoryRecord {
    /// Local timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub creation: String,
    pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredInsertRequest {
    pub routes: Vec<RouteHistoryRecord>,
}
