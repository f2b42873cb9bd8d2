//! Application context shared by the router, page container and views
//!
//! Every member is a cheap handle; cloning the context shares the caches.

use crate::config::DeskConfig;
use crate::form::layout::LayoutLabels;
use crate::form::{DialogSlot, LayoutOptions};
use crate::model::{DocumentStore, MetaStore, ScriptManager};
use crate::shared::api::InflightTracker;
use crate::shared::messages::MessageLog;
use crate::shared::storage::SharedStore;
use crate::shared::translate::{SharedTranslator, Untranslated};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Default)]
struct MetaRequestState {
    pending: Vec<String>,
    requested: HashSet<String>,
    failed: HashSet<String>,
}

/// Doctype metadata the views asked for and the browser has yet to fetch.
#[derive(Clone, Default)]
pub struct MetaRequests {
    state: Rc<RefCell<MetaRequestState>>,
}

impl MetaRequests {
    /// Queue a fetch unless one is already under way.
    pub fn request(&self, doctype: &str) {
        let mut state = self.state.borrow_mut();
        if state.requested.insert(doctype.to_string()) {
            log::debug!("metadata requested: {}", doctype);
            state.pending.push(doctype.to_string());
        }
    }

    pub fn take_pending(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    pub fn loaded(&self, doctype: &str) {
        let mut state = self.state.borrow_mut();
        state.requested.remove(doctype);
        state.failed.remove(doctype);
    }

    pub fn failed(&self, doctype: &str) {
        let mut state = self.state.borrow_mut();
        state.requested.remove(doctype);
        state.failed.insert(doctype.to_string());
    }

    pub fn has_failed(&self, doctype: &str) -> bool {
        self.state.borrow().failed.contains(doctype)
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<DeskConfig>,
    pub meta: MetaStore,
    pub docs: DocumentStore,
    pub scripts: ScriptManager,
    pub storage: SharedStore,
    pub translator: SharedTranslator,
    pub messages: MessageLog,
    pub dialogs: DialogSlot,
    pub inflight: InflightTracker,
    pub meta_requests: MetaRequests,
}

impl AppContext {
    pub fn new(config: DeskConfig, storage: SharedStore) -> Self {
        Self {
            config: Rc::new(config),
            meta: MetaStore::new(),
            docs: DocumentStore::new(),
            scripts: ScriptManager::new(),
            storage,
            translator: Rc::new(Untranslated),
            messages: MessageLog::new(),
            dialogs: DialogSlot::new(),
            inflight: InflightTracker::new(),
            meta_requests: MetaRequests::default(),
        }
    }

    pub fn with_translator(mut self, translator: SharedTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn translate(&self, text: &str) -> String {
        self.translator.translate(text)
    }

    /// Layout options wired to this context's caches.
    pub fn layout_options(&self, doctype: &str) -> LayoutOptions {
        LayoutOptions::new(doctype, self.meta.clone())
            .with_scripts(Some(self.scripts.clone()))
            .with_storage(self.storage.clone())
            .with_translator(self.translator.clone())
            .with_labels(LayoutLabels::from(&self.config.layout))
    }
}
