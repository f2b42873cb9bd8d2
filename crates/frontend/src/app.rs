//! Browser entry component
//!
//! Builds the desk, binds it to `hashchange`, and runs the network side of
//! navigation: metadata fetches, script triggers, debounced title capture
//! and route-history persistence.

use crate::browser::{boot_config, on_window_event, BrowserLocation};
use crate::config::{load_config, DeskConfig};
use crate::context::AppContext;
use crate::desk::{Desk, DeskError};
use crate::pages::PageHost;
use crate::routing::{Dispatch, RouteArg, TitleAction};
use crate::shared::api::{HttpRpc, InflightTracker, RpcError};
use crate::shared::storage::BrowserStorage;
use contracts::shared::rpc::{
    DocTypeBundle, GetDocTypeRequest, RunTriggerRequest, GET_DOCTYPE_METHOD, RUN_TRIGGER_METHOD,
};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Failures of a navigation are not swallowed: they surface as uncaught
/// JavaScript exceptions.
fn rethrow(err: DeskError) -> ! {
    wasm_bindgen::throw_str(&err.to_string())
}

/// Resolves after `settle_delay_ms`, once no request is in flight.
async fn settled(inflight: InflightTracker, delay_ms: u32, poll_ms: u32) {
    TimeoutFuture::new(delay_ms).await;
    while !inflight.is_idle() {
        TimeoutFuture::new(poll_ms).await;
    }
}

/// Copy handle to the desk for components and event listeners.
#[derive(Clone, Copy)]
pub struct DeskHandle {
    desk: StoredValue<Desk, LocalStorage>,
    /// Bumped after every mutation; readers re-run on change.
    version: RwSignal<u64>,
    title_timer: StoredValue<u64>,
    history_timer: StoredValue<u64>,
}

impl DeskHandle {
    pub fn new(desk: Desk) -> Self {
        Self {
            desk: StoredValue::new_local(desk),
            version: RwSignal::new(0),
            title_timer: StoredValue::new(0),
            history_timer: StoredValue::new(0),
        }
    }

    /// Read the desk, re-running the caller after the next update.
    pub fn with<R>(&self, f: impl FnOnce(&Desk) -> R) -> Option<R> {
        self.version.track();
        self.desk.try_with_value(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&Desk) -> R) -> Option<R> {
        self.desk.try_with_value(f)
    }

    /// Mutate the desk, then notify readers and send whatever requests the
    /// change queued.
    pub fn update<R>(&self, f: impl FnOnce(&mut Desk) -> R) -> Option<R> {
        let out = self.desk.try_update_value(f);
        self.version.update(|v| *v += 1);
        self.pump();
        out
    }

    fn rpc(&self) -> Option<HttpRpc> {
        self.with_untracked(|d| HttpRpc::new(d.app().inflight.clone()))
    }

    fn config(&self) -> DeskConfig {
        self.with_untracked(|d| (*d.app().config).clone())
            .unwrap_or_default()
    }

    /// Dispatch the current location.
    pub fn route(&self) {
        match self.update(|d| d.route()) {
            Some(Ok(dispatch)) => self.after_dispatch(dispatch),
            Some(Err(err)) => rethrow(err),
            None => log::warn!("desk disposed, location change ignored"),
        }
    }

    /// Navigate; the future resolves once the resulting page's requests
    /// have drained.
    pub fn set_route<I, A>(&self, args: I) -> Pin<Box<dyn Future<Output = ()>>>
    where
        I: IntoIterator<Item = A>,
        A: Into<RouteArg>,
    {
        let router = self.config().router;
        let inflight = self
            .update(|d| {
                d.set_route(args);
                d.app().inflight.clone()
            })
            .unwrap_or_default();
        Box::pin(settled(inflight, router.settle_delay_ms, router.settle_poll_ms))
    }

    fn after_dispatch(&self, dispatch: Dispatch) {
        if let Dispatch::Routed {
            title: TitleAction::Capture { route, delay_ms },
            ..
        } = dispatch
        {
            self.capture_title_later(route, delay_ms);
        }
        self.persist_history_later();
    }

    fn capture_title_later(&self, route: String, delay_ms: u32) {
        let handle = *self;
        self.title_timer.update_value(|g| *g += 1);
        let generation = self.title_timer.get_value();
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            if handle.title_timer.get_value() == generation {
                handle
                    .desk
                    .try_update_value(|d| d.router_mut().capture_title(&route));
            }
        });
    }

    fn persist_history_later(&self) {
        let handle = *self;
        let delay_ms = self.config().history.persist_delay_ms;
        self.history_timer.update_value(|g| *g += 1);
        let generation = self.history_timer.get_value();
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            if handle.history_timer.get_value() == generation {
                handle.flush_history().await;
            }
        });
    }

    async fn flush_history(self) {
        let method = self.config().history.persist_method;
        let Some(Some(batch)) = self
            .desk
            .try_update_value(|d| d.router_mut().take_history_batch())
        else {
            return;
        };
        let Some(rpc) = self.rpc() else {
            return;
        };
        log::debug!("saving {} route history entries", batch.routes.len());
        if let Err(e) = rpc.call(&method, &batch).await {
            log::warn!("route history: {}", e);
            self.desk
                .try_update_value(|d| d.router_mut().requeue_history(batch));
        }
    }

    /// Send queued metadata and trigger requests.
    fn pump(&self) {
        let Some((doctypes, triggers)) =
            self.with_untracked(|d| (d.take_meta_requests(), d.take_trigger_requests()))
        else {
            return;
        };
        for doctype in doctypes {
            spawn_local(self.fetch_meta(doctype));
        }
        for request in triggers {
            spawn_local(self.run_trigger(request));
        }
    }

    async fn fetch_meta(self, doctype: String) {
        let Some(rpc) = self.rpc() else {
            return;
        };
        let args = GetDocTypeRequest {
            doctype: doctype.clone(),
            with_parent: true,
        };
        let result = rpc.call(GET_DOCTYPE_METHOD, &args).await.and_then(|value| {
            serde_json::from_value::<DocTypeBundle>(value).map_err(|e| RpcError::Parse(e.to_string()))
        });
        match result {
            Ok(bundle) => match self.update(|d| d.on_meta_loaded(bundle.docs)) {
                Some(Ok(Some(dispatch))) => self.after_dispatch(dispatch),
                Some(Err(err)) => rethrow(err),
                _ => {}
            },
            Err(e) => {
                self.update(|d| d.on_meta_failed(&doctype, &e.to_string()));
            }
        }
    }

    async fn run_trigger(self, request: RunTriggerRequest) {
        let Some(rpc) = self.rpc() else {
            return;
        };
        match rpc.call(RUN_TRIGGER_METHOD, &request).await {
            Ok(value) => {
                if let Some(Err(err)) = self.update(|d| d.resolve_trigger(&request, value)) {
                    log::error!("{}", err);
                }
            }
            Err(e) => {
                log::warn!("run_trigger {}: {}", request.trigger, e);
                self.update(|d| d.fail_trigger(&request));
            }
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config(boot_config().as_deref()).unwrap_or_else(|e| {
        log::error!("{}", e);
        DeskConfig::default()
    });
    let app = AppContext::new(config, Rc::new(BrowserStorage));
    let desk = DeskHandle::new(Desk::new(app, Rc::new(BrowserLocation)));
    provide_context(desk);

    on_window_event("hashchange", move |_| desk.route());
    on_window_event("beforeunload", move |_| {
        desk.with_untracked(|d| d.router().remember_last_route());
    });

    let restored = desk
        .update(|d| d.router_mut().restore_last_route())
        .unwrap_or(false);
    // A restored route arrives through `hashchange`.
    if !restored {
        desk.route();
    }

    view! {
        <PageHost />
    }
}
