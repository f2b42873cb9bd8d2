//! Form script handlers backing `fn:` dependencies
//!
//! A trigger is answered by a handler registered in the client, or by the
//! server through `run_trigger`. Server answers arrive later: the first
//! lookup queues a request and reports "pending"; the evaluator then keeps
//! the last known visibility until the result is resolved.

use crate::form::depends::ScriptHook;
use contracts::shared::rpc::RunTriggerRequest;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

type Handler = Rc<dyn Fn(&str) -> Value>;
type TriggerKey = (String, String, String);

#[derive(Default)]
struct ScriptInner {
    /// (doctype, trigger) -> handler receiving the docname
    handlers: HashMap<(String, String), Handler>,
    resolved: HashMap<TriggerKey, Value>,
    pending: Vec<RunTriggerRequest>,
    in_flight: HashSet<TriggerKey>,
}

#[derive(Clone, Default)]
pub struct ScriptManager {
    inner: Rc<RefCell<ScriptInner>>,
}

fn key(doctype: &str, docname: &str, trigger: &str) -> TriggerKey {
    (doctype.to_string(), docname.to_string(), trigger.to_string())
}

impl ScriptManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, doctype: &str, trigger: &str, handler: impl Fn(&str) -> Value + 'static) {
        self.inner.borrow_mut().handlers.insert(
            (doctype.to_string(), trigger.to_string()),
            Rc::new(handler),
        );
    }

    /// Result of `trigger` for a document, `None` while unresolved.
    pub fn trigger(&self, doctype: &str, docname: &str, trigger: &str) -> Option<Value> {
        let handler = self
            .inner
            .borrow()
            .handlers
            .get(&(doctype.to_string(), trigger.to_string()))
            .cloned();
        if let Some(handler) = handler {
            return Some(handler(docname));
        }

        let k = key(doctype, docname, trigger);
        let mut inner = self.inner.borrow_mut();
        if let Some(value) = inner.resolved.get(&k) {
            return Some(value.clone());
        }
        if inner.in_flight.insert(k) {
            inner.pending.push(RunTriggerRequest {
                doctype: doctype.to_string(),
                docname: docname.to_string(),
                trigger: trigger.to_string(),
            });
        }
        None
    }

    pub fn take_pending(&self) -> Vec<RunTriggerRequest> {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }

    pub fn resolve(&self, request: &RunTriggerRequest, value: Value) {
        let k = key(&request.doctype, &request.docname, &request.trigger);
        let mut inner = self.inner.borrow_mut();
        inner.in_flight.remove(&k);
        inner.resolved.insert(k, value);
    }

    /// Forget a failed request so the next lookup asks again.
    pub fn fail(&self, request: &RunTriggerRequest) {
        let k = key(&request.doctype, &request.docname, &request.trigger);
        self.inner.borrow_mut().in_flight.remove(&k);
    }

    /// Drop cached server answers for a document (after it changed).
    pub fn invalidate(&self, doctype: &str, docname: &str) {
        self.inner
            .borrow_mut()
            .resolved
            .retain(|(dt, dn, _), _| !(dt == doctype && dn == docname));
    }

    /// Bind to one document for use by the dependency evaluator.
    pub fn for_doc(&self, doctype: &str, docname: &str) -> DocScripts {
        DocScripts {
            manager: self.clone(),
            doctype: doctype.to_string(),
            docname: docname.to_string(),
        }
    }
}

pub struct DocScripts {
    manager: ScriptManager,
    doctype: String,
    docname: String,
}

impl ScriptHook for DocScripts {
    fn call(&self, function: &str) -> Option<Value> {
        self.manager.trigger(&self.doctype, &self.docname, function)
    }
}
