//! Location-driven dispatch
//!
//! The router owns the route history, the rename redirects and the shared
//! route options. It never renders anything itself: a [`RouteTarget`]
//! (the desk) shows the view for each dispatched route. Browser bindings
//! call [`Router::route`] on every location change.

use super::history::RouteHistory;
use super::location::SharedLocation;
use super::parser::{decode_route_str, encode_segment, parse, strip_prefix, ParsedRoute};
use super::route::Route;
use super::titles::{TitleAction, TitleCache};
use crate::config::{DeskConfig, RouterConfig};
use crate::shared::events::EventBus;
use crate::shared::storage::SharedStore;
use contracts::system::route_history::DeferredInsertRequest;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Something that can show the view for a route.
pub trait RouteTarget {
    type Error;

    /// Errors are returned to the caller of [`Router::route`] unchanged.
    fn show_route(&mut self, route: &Route, router: &mut Router) -> Result<(), Self::Error>;
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Location was a renamed route already shown: went back instead.
    WentBack,
    /// Location was a renamed route: rewritten to its new location.
    Redirected(String),
    /// Legacy alias: a navigation to the canonical route was issued.
    Aborted,
    Routed { route: Route, title: TitleAction },
}

/// One argument of [`Router::set_route`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteArg {
    Segment(String),
    /// Merged into the route options instead of the location.
    Options(Map<String, Value>),
}

impl From<&str> for RouteArg {
    fn from(segment: &str) -> Self {
        Self::Segment(segment.to_string())
    }
}

impl From<String> for RouteArg {
    fn from(segment: String) -> Self {
        Self::Segment(segment)
    }
}

impl From<Map<String, Value>> for RouteArg {
    fn from(options: Map<String, Value>) -> Self {
        Self::Options(options)
    }
}

pub struct Router {
    config: RouterConfig,
    location: SharedLocation,
    storage: SharedStore,
    last_route_key: String,
    current: Route,
    history: RouteHistory,
    /// Stripped old location → new location.
    re_route: HashMap<String, String>,
    route_options: Map<String, Value>,
    titles: TitleCache,
    pub events: EventBus<Route>,
}

impl Router {
    pub fn new(config: &DeskConfig, location: SharedLocation, storage: SharedStore) -> Self {
        Self {
            config: config.router.clone(),
            location,
            storage,
            last_route_key: config.storage.last_route_key.clone(),
            current: Route::default(),
            history: RouteHistory::new(config.history.skip_routes.clone()),
            re_route: HashMap::new(),
            route_options: Map::new(),
            titles: TitleCache::default(),
            events: EventBus::new(),
        }
    }

    pub fn location(&self) -> &SharedLocation {
        &self.location
    }

    /// Route of the last completed dispatch.
    pub fn current_route(&self) -> &Route {
        &self.current
    }

    /// Decoded, prefix-stripped location.
    pub fn current_route_str(&self) -> String {
        decode_route_str(&self.location.hash())
    }

    pub fn get_prev_route(&self) -> Route {
        self.history.prev_route()
    }

    pub fn history(&self) -> &RouteHistory {
        &self.history
    }

    pub fn route_options(&self) -> &Map<String, Value> {
        &self.route_options
    }

    /// Hand the route options to the view that consumes them.
    pub fn take_route_options(&mut self) -> Map<String, Value> {
        std::mem::take(&mut self.route_options)
    }

    fn merge_options(&mut self, options: Map<String, Value>) {
        self.route_options.extend(options);
    }

    /// Dispatch the current location.
    pub fn route<T: RouteTarget>(&mut self, target: &mut T) -> Result<Dispatch, T::Error> {
        let raw = self.location.hash();
        let key = strip_prefix(&raw).to_string();
        if let Some(redirect) = self.re_route.get(&key).cloned() {
            if decode_route_str(&redirect) == self.current.to_route_string() {
                log::debug!("{} was renamed to the current route, going back", key);
                self.location.back();
                return Ok(Dispatch::WentBack);
            }
            log::debug!("re-routing {} to {}", key, redirect);
            self.location.set_hash(&redirect);
            return Ok(Dispatch::Redirected(redirect));
        }

        let (route, options) = match parse(&raw, &self.config) {
            ParsedRoute::Redirect(canonical) => {
                self.set_route(canonical.segments().iter().map(String::as_str));
                return Ok(Dispatch::Aborted);
            }
            ParsedRoute::Route { route, options } => (route, options),
        };
        self.merge_options(options);

        // A re-dispatch of the route already shown is not a navigation.
        if route != self.current || self.history.is_empty() {
            self.history.push(&route);
        }
        self.current = route.clone();
        log::debug!("routing to {}", route);

        target.show_route(&route, self)?;
        self.events.trigger("change", &route);

        let title = self.title_action(&route);
        Ok(Dispatch::Routed { route, title })
    }

    fn title_action(&self, route: &Route) -> TitleAction {
        let key = route.to_route_string();
        match self.titles.get(&key) {
            Some(title) => {
                self.location.set_title(title);
                TitleAction::Applied(title.to_string())
            }
            None => TitleAction::Capture {
                route: key,
                delay_ms: self.config.title_capture_delay_ms,
            },
        }
    }

    /// Remember the window title for `route` if it is still current.
    pub fn capture_title(&mut self, route: &str) {
        if self.current.to_route_string() != route {
            return;
        }
        let title = self.location.title();
        self.titles.record(route, &title);
    }

    /// Navigate programmatically. Option arguments are merged into the
    /// route options; the rest are joined with `/`. Returns the new
    /// location.
    pub fn set_route<I, A>(&mut self, args: I) -> String
    where
        I: IntoIterator<Item = A>,
        A: Into<RouteArg>,
    {
        let mut segments = Vec::new();
        for arg in args {
            match arg.into() {
                RouteArg::Segment(segment) => segments.push(encode_segment(&segment).into_owned()),
                RouteArg::Options(options) => self.merge_options(options),
            }
        }
        let hash = segments.join("/");
        log::debug!("set_route {}", hash);
        self.location.set_hash(&hash);
        hash
    }

    /// Like [`Router::set_route`], and later visits to the location being
    /// left are rewritten to the new one.
    pub fn set_re_route<I, A>(&mut self, args: I) -> String
    where
        I: IntoIterator<Item = A>,
        A: Into<RouteArg>,
    {
        let from = strip_prefix(&self.location.hash()).to_string();
        let to = self.set_route(args);
        if from != to {
            self.re_route.insert(from, to.clone());
        }
        to
    }

    pub fn remember_last_route(&self) {
        let route = strip_prefix(&self.location.hash()).to_string();
        if !route.is_empty() {
            self.storage.set(&self.last_route_key, &route);
        }
    }

    /// Navigate to the route remembered by the previous session, once.
    pub fn restore_last_route(&mut self) -> bool {
        let Some(route) = self.storage.get(&self.last_route_key) else {
            return false;
        };
        self.storage.remove(&self.last_route_key);
        if route.is_empty() || route == strip_prefix(&self.location.hash()) {
            return false;
        }
        log::info!("restoring last route {}", route);
        self.location.set_hash(&route);
        true
    }

    pub fn take_history_batch(&mut self) -> Option<DeferredInsertRequest> {
        self.history.take_batch()
    }

    pub fn requeue_history(&mut self, batch: DeferredInsertRequest) {
        log::warn!("route history not saved, {} entries requeued", batch.routes.len());
        self.history.requeue(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::location::{Location, MemoryLocation};
    use crate::shared::storage::{KeyValueStore, MemoryStorage};
    use serde_json::json;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        shown: Vec<Route>,
        fail_on: Option<&'static str>,
    }

    impl RouteTarget for Recorder {
        type Error = String;

        fn show_route(&mut self, route: &Route, _router: &mut Router) -> Result<(), String> {
            if route.kind() == self.fail_on {
                return Err(format!("cannot show {}", route));
            }
            self.shown.push(route.clone());
            Ok(())
        }
    }

    fn router_with(location: &MemoryLocation, storage: &MemoryStorage) -> Router {
        Router::new(
            &DeskConfig::default(),
            Rc::new(location.clone()),
            Rc::new(storage.clone()),
        )
    }

    fn setup(initial: &str) -> (Router, MemoryLocation, MemoryStorage) {
        let location = MemoryLocation::new(initial);
        let storage = MemoryStorage::new();
        (router_with(&location, &storage), location, storage)
    }

    #[test]
    fn test_dispatch_pushes_history_and_shows() {
        let (mut router, location, _) = setup("#List/Task");
        let mut target = Recorder::default();
        let dispatch = router.route(&mut target).unwrap();
        assert!(matches!(dispatch, Dispatch::Routed { .. }));
        assert_eq!(target.shown, vec![Route::from(["List", "Task"])]);

        location.set_hash("Form/Task/T-1");
        router.route(&mut target).unwrap();
        assert_eq!(router.history().len(), 2);
        assert_eq!(router.get_prev_route(), Route::from(["List", "Task"]));
        assert_eq!(router.current_route_str(), "Form/Task/T-1");
    }

    #[test]
    fn test_route_options_merge_last_wins() {
        let (mut router, location, _) = setup("Form/Task/X?foo=1&bar=2");
        let mut target = Recorder::default();
        router.route(&mut target).unwrap();
        assert_eq!(target.shown[0], Route::from(["Form", "Task", "X"]));
        assert_eq!(router.route_options().get("foo"), Some(&json!("1")));

        location.set_hash("List/Task?foo=3");
        router.route(&mut target).unwrap();
        assert_eq!(router.route_options().get("foo"), Some(&json!("3")));
        assert_eq!(router.route_options().get("bar"), Some(&json!("2")));
        assert_eq!(router.take_route_options().len(), 2);
        assert!(router.route_options().is_empty());
    }

    #[test]
    fn test_re_route_lands_on_new_name_with_one_history_entry() {
        let (mut router, location, _) = setup("Form/Task/new-task-1");
        let mut target = Recorder::default();
        router.route(&mut target).unwrap();
        let before = router.history().len();

        router.set_re_route(["Form", "Task", "TASK-0001"]);
        router.route(&mut target).unwrap();

        // A stale link to the old name.
        location.set_hash("Form/Task/new-task-1");
        assert_eq!(router.route(&mut target).unwrap(), Dispatch::WentBack);
        assert_eq!(location.hash(), "Form/Task/TASK-0001");
        router.route(&mut target).unwrap();

        assert_eq!(router.history().len(), before + 1);
        assert_eq!(router.current_route(), &Route::from(["Form", "Task", "TASK-0001"]));
    }

    #[test]
    fn test_re_route_rewrites_when_elsewhere() {
        let (mut router, location, _) = setup("Form/Task/new-task-1");
        let mut target = Recorder::default();
        router.route(&mut target).unwrap();
        router.set_re_route(["Form", "Task", "TASK-0001"]);
        router.route(&mut target).unwrap();

        location.set_hash("List/Task");
        router.route(&mut target).unwrap();
        location.set_hash("Form/Task/new-task-1");
        assert_eq!(
            router.route(&mut target).unwrap(),
            Dispatch::Redirected("Form/Task/TASK-0001".into())
        );
        assert_eq!(location.hash(), "Form/Task/TASK-0001");
    }

    #[test]
    fn test_legacy_alias_aborts_dispatch() {
        let (mut router, location, _) = setup("Module/Accounts");
        let mut target = Recorder::default();
        assert_eq!(router.route(&mut target).unwrap(), Dispatch::Aborted);
        assert!(target.shown.is_empty());
        assert!(router.history().is_empty());
        assert_eq!(location.hash(), "modules/Accounts");
    }

    #[test]
    fn test_show_errors_propagate() {
        let (mut router, _, _) = setup("Form/Task/T-1");
        let mut target = Recorder {
            fail_on: Some("Form"),
            ..Default::default()
        };
        assert_eq!(
            router.route(&mut target),
            Err("cannot show Form/Task/T-1".to_string())
        );
    }

    #[test]
    fn test_set_route_encodes_and_merges_options() {
        let (mut router, location, _) = setup("");
        let mut options = Map::new();
        options.insert("status".into(), json!("Open"));
        let hash = router.set_route(vec![
            RouteArg::from("List"),
            RouteArg::from("100% Tasks"),
            RouteArg::from(options),
        ]);
        assert_eq!(hash, "List/100%25%20Tasks");
        assert_eq!(location.hash(), hash);
        assert_eq!(router.route_options().get("status"), Some(&json!("Open")));
    }

    #[test]
    fn test_title_cached_per_route() {
        let (mut router, location, _) = setup("List/Task");
        let mut target = Recorder::default();
        let Dispatch::Routed { title, .. } = router.route(&mut target).unwrap() else {
            panic!("expected a routed dispatch");
        };
        assert_eq!(
            title,
            TitleAction::Capture {
                route: "List/Task".into(),
                delay_ms: 1000
            }
        );
        location.set_title("Task List");
        router.capture_title("List/Task");

        location.set_hash("Form/Task/T-1");
        router.route(&mut target).unwrap();
        location.set_title("T-1");
        router.capture_title("List/Task");

        location.set_hash("List/Task");
        let Dispatch::Routed { title, .. } = router.route(&mut target).unwrap() else {
            panic!("expected a routed dispatch");
        };
        assert_eq!(title, TitleAction::Applied("Task List".into()));
        assert_eq!(location.title(), "Task List");
    }

    #[test]
    fn test_last_route_restored_once() {
        let (mut router, location, storage) = setup("List/Task");
        router.remember_last_route();
        assert_eq!(storage.get("session_last_route").as_deref(), Some("List/Task"));

        let fresh_location = MemoryLocation::new("");
        let mut fresh = router_with(&fresh_location, &storage);
        assert!(fresh.restore_last_route());
        assert_eq!(fresh_location.hash(), "List/Task");
        assert!(!fresh.restore_last_route());
        assert!(storage.get("session_last_route").is_none());

        // Same location: nothing to restore.
        router.remember_last_route();
        assert!(!router.restore_last_route());
        assert_eq!(location.hash(), "List/Task");
    }
}
