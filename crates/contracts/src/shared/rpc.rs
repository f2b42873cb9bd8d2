//! Payloads exchanged with the backend method endpoint
//!
//! Every call is `POST /api/method/<method>` with a JSON body of arguments;
//! the reply wraps the return value in `message` and an exception text in
//! `exc`.

use super::metadata::DocTypeMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_DOCTYPE_METHOD: &str = "frappe.desk.form.load.getdoctype";
pub const RUN_TRIGGER_METHOD: &str = "frappe.desk.form.utils.run_trigger";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodResponse {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub exc: Option<String>,
}

impl MethodResponse {
    pub fn into_result(self) -> Result<Value, String> {
        match self.exc {
            Some(exc) => Err(exc),
            None => Ok(self.message.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDocTypeRequest {
    pub doctype: String,
    #[serde(default)]
    pub with_parent: bool,
}

/// A doctype together with the child doctypes its tables reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocTypeBundle {
    #[serde(default)]
    pub docs: Vec<DocTypeMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTriggerRequest {
    pub doctype: String,
    pub docname: String,
    pub trigger: String,
}
