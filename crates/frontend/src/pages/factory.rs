//! View factories: build the page for a route kind, once per route
//!
//! A factory is looked up by the route's first segment in a
//! [`FactoryRegistry`] and constructed the first time it is needed.

use super::container::{PageContainer, PageContent, PageId};
use super::form_factory::FormFactory;
use super::list_factory::ListFactory;
use crate::context::AppContext;
use crate::form::LayoutError;
use crate::routing::{Route, Router};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error("Metadata for {0} could not be loaded")]
    MissingMeta(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Everything a factory may touch while showing a route.
pub struct ViewCx<'a> {
    pub app: &'a AppContext,
    pub route: &'a Route,
    pub router: &'a mut Router,
    pub container: &'a mut PageContainer,
}

impl ViewCx<'_> {
    /// Page label for the route being shown.
    pub fn label(&self) -> String {
        self.route.to_route_string()
    }

    /// Queue a metadata fetch and show a placeholder page until it lands.
    pub fn show_loading(&mut self, doctype: &str) -> Result<Option<PageId>, ViewError> {
        if self.app.meta_requests.has_failed(doctype) {
            return Err(ViewError::MissingMeta(doctype.to_string()));
        }
        self.app.meta_requests.request(doctype);
        let label = self.label();
        let content = PageContent::Loading {
            doctype: doctype.to_string(),
        };
        Ok(Some(make_page(self.container, false, &label, content)))
    }
}

pub trait ViewFactory {
    /// Build the page for `cx.route` and activate it.
    fn make(&mut self, cx: &mut ViewCx<'_>) -> Result<Option<PageId>, ViewError>;

    /// Runs when an existing page is shown again.
    fn on_show(&mut self, _page: PageId, _cx: &mut ViewCx<'_>) -> Result<(), ViewError> {
        Ok(())
    }

    fn show(&mut self, cx: &mut ViewCx<'_>) -> Result<Option<PageId>, ViewError> {
        let label = cx.label();
        if let Some(id) = cx.container.get(&label) {
            cx.container.change_to_page(id);
            self.on_show(id, cx)?;
            return Ok(Some(id));
        }
        if cx.route.get(1).is_some_and(|s| !s.is_empty()) {
            self.make(cx)
        } else {
            Ok(Some(show_not_found(cx.container, &label)))
        }
    }
}

/// Create a page, fill it and make it the active one.
pub fn make_page(
    container: &mut PageContainer,
    double_column: bool,
    label: &str,
    content: PageContent,
) -> PageId {
    let id = container.add_page(label);
    container.set_double_column(id, double_column);
    container.set_content(id, content);
    container.change_to_page(id)
}

pub fn show_not_found(container: &mut PageContainer, label: &str) -> PageId {
    log::info!("nothing to show for {}", label);
    let id = match container.get(label) {
        Some(id) => id,
        None => {
            let id = container.add_page(label);
            container.set_content(id, PageContent::NotFound);
            container.page_mut(id).title = "Not Found".into();
            id
        }
    };
    container.change_to_page(id)
}

type Constructor = Box<dyn Fn() -> Box<dyn ViewFactory>>;

/// Factory key for a route kind: `form` and `Form` share one factory.
fn factory_key(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Default)]
pub struct FactoryRegistry {
    constructors: HashMap<String, Constructor>,
    instances: HashMap<String, Box<dyn ViewFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the form and list factories.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Form", || Box::new(FormFactory));
        registry.register("List", || Box::new(ListFactory));
        registry
    }

    pub fn register(&mut self, kind: &str, constructor: impl Fn() -> Box<dyn ViewFactory> + 'static) {
        self.constructors
            .insert(factory_key(kind), Box::new(constructor));
    }

    pub fn has(&self, kind: &str) -> bool {
        self.constructors.contains_key(&factory_key(kind))
    }

    /// The factory for `kind`, constructed on first use.
    pub fn get(&mut self, kind: &str) -> Option<&mut Box<dyn ViewFactory>> {
        let key = factory_key(kind);
        if !self.instances.contains_key(&key) {
            let constructor = self.constructors.get(&key)?;
            log::debug!("creating {} factory", key);
            self.instances.insert(key.clone(), constructor());
        }
        self.instances.get_mut(&key)
    }
}
