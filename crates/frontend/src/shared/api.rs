//! Method calls to the backend and tracking of requests in flight
//!
//! Every call is `POST /api/method/<method>` with a JSON body. The
//! [`InflightTracker`] counts open calls so navigation can wait for the
//! network to settle before running follow-up work (`after_ajax`).

use contracts::shared::rpc::MethodResponse;
use gloo_net::http::Request;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcError {
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
    #[error("Failed to send request: {0}")]
    Transport(String),
    #[error("Request failed: {0}")]
    Status(u16),
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Server error: {0}")]
    Server(String),
}

// ============================================================================
// In-flight tracking
// ============================================================================

#[derive(Default)]
struct InflightState {
    active: usize,
    waiters: Vec<Box<dyn FnOnce()>>,
}

/// Shared counter of open requests.
#[derive(Clone, Default)]
pub struct InflightTracker {
    state: Rc<RefCell<InflightState>>,
}

/// Decrements the tracker when dropped.
pub struct InflightGuard {
    tracker: InflightTracker,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> InflightGuard {
        self.state.borrow_mut().active += 1;
        InflightGuard {
            tracker: self.clone(),
        }
    }

    fn finish(&self) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.active = state.active.saturating_sub(1);
            if state.active > 0 {
                return;
            }
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            waiter();
        }
    }

    pub fn active(&self) -> usize {
        self.state.borrow().active
    }

    pub fn is_idle(&self) -> bool {
        self.active() == 0
    }

    /// Run `callback` now if nothing is in flight, otherwise once the last
    /// open request finishes.
    pub fn after_ajax(&self, callback: impl FnOnce() + 'static) {
        if self.is_idle() {
            callback();
        } else {
            self.state.borrow_mut().waiters.push(Box::new(callback));
        }
    }
}

// ============================================================================
// HTTP transport
// ============================================================================

pub fn method_url(method: &str) -> String {
    format!("/api/method/{}", method)
}

#[derive(Clone, Default)]
pub struct HttpRpc {
    inflight: InflightTracker,
}

impl HttpRpc {
    pub fn new(inflight: InflightTracker) -> Self {
        Self { inflight }
    }

    pub async fn call<A: Serialize>(&self, method: &str, args: &A) -> Result<Value, RpcError> {
        let _guard = self.inflight.begin();
        log::debug!("rpc -> {}", method);

        let response = Request::post(&method_url(method))
            .json(args)
            .map_err(|e| RpcError::Serialize(e.to_string()))?
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(RpcError::Status(response.status()));
        }

        let body = response
            .json::<MethodResponse>()
            .await
            .map_err(|e| RpcError::Parse(e.to_string()))?;
        body.into_result().map_err(RpcError::Server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_ajax_runs_immediately_when_idle() {
        let tracker = InflightTracker::new();
        let ran = Rc::new(RefCell::new(false));
        let r = ran.clone();
        tracker.after_ajax(move || *r.borrow_mut() = true);
        assert!(*ran.borrow());
    }

    #[test]
    fn test_after_ajax_waits_for_last_request() {
        let tracker = InflightTracker::new();
        let ran = Rc::new(RefCell::new(0));
        let first = tracker.begin();
        let second = tracker.begin();
        let r = ran.clone();
        tracker.after_ajax(move || *r.borrow_mut() += 1);
        drop(first);
        assert_eq!(*ran.borrow(), 0);
        drop(second);
        assert_eq!(*ran.borrow(), 1);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_method_url() {
        assert_eq!(
            method_url("frappe.desk.form.load.getdoctype"),
            "/api/method/frappe.desk.form.load.getdoctype"
        );
    }
}
