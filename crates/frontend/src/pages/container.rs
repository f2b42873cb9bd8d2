//! Page container: every page ever opened, at most one of them active
//!
//! Pages are created once per label and never destroyed; navigating back to
//! a label re-shows the cached page.

use super::form_factory::FormPage;
use super::list_factory::ListPage;
use crate::form::DialogSlot;
use crate::shared::events::EventBus;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub usize);

/// Signals delivered to a page's own event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    Show,
    Hide,
    /// `change_to` named the page that is already active.
    Reshow,
}

/// Events of the container itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    PageChange { label: String, has_sidebar: bool },
    ScrollTop,
    Breadcrumbs,
}

pub enum PageContent {
    Blank,
    /// Waiting for the metadata of `doctype`.
    Loading { doctype: String },
    NotFound,
    Standard { name: String, title: String },
    Form(Box<FormPage>),
    List(ListPage),
}

impl PageContent {
    /// Layout guess for pages that never registered one.
    fn has_sidebar(&self) -> bool {
        matches!(self, PageContent::List(_))
    }
}

pub struct Page {
    pub id: PageId,
    pub label: String,
    pub title: String,
    pub visible: bool,
    /// Set once the page declares its layout.
    pub double_column: Option<bool>,
    pub content: PageContent,
    pub events: EventBus<PageSignal>,
}

pub struct PageContainer {
    pages: Vec<Page>,
    by_label: HashMap<String, PageId>,
    current: Option<PageId>,
    dialogs: DialogSlot,
    pub events: EventBus<ContainerEvent>,
}

impl PageContainer {
    pub fn new(dialogs: DialogSlot) -> Self {
        Self {
            pages: Vec::new(),
            by_label: HashMap::new(),
            current: None,
            dialogs,
            events: EventBus::new(),
        }
    }

    /// Register a hidden page. A second call with the same label creates a
    /// second page that shadows the first; callers check with [`Self::get`].
    pub fn add_page(&mut self, label: &str) -> PageId {
        let id = PageId(self.pages.len());
        log::debug!("add page {}", label);
        self.pages.push(Page {
            id,
            label: label.to_string(),
            title: label.to_string(),
            visible: false,
            double_column: None,
            content: PageContent::Blank,
            events: EventBus::new(),
        });
        self.by_label.insert(label.to_string(), id);
        id
    }

    pub fn get(&self, label: &str) -> Option<PageId> {
        self.by_label.get(label).copied()
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn page_mut(&mut self, id: PageId) -> &mut Page {
        &mut self.pages[id.0]
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut Page> {
        self.pages.iter_mut()
    }

    pub fn current(&self) -> Option<PageId> {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.map(|id| self.page(id))
    }

    pub fn set_content(&mut self, id: PageId, content: PageContent) {
        self.pages[id.0].content = content;
    }

    /// Move a page to a new label, keeping its contents.
    pub fn relabel(&mut self, id: PageId, label: &str) {
        let page = &mut self.pages[id.0];
        if self.by_label.get(&page.label) == Some(&id) {
            self.by_label.remove(&page.label);
        }
        page.label = label.to_string();
        self.by_label.insert(label.to_string(), id);
    }

    pub fn set_double_column(&mut self, id: PageId, double_column: bool) {
        self.pages[id.0].double_column = Some(double_column);
    }

    /// Activate the page registered under `label`. Unknown labels are
    /// logged and ignored.
    pub fn change_to(&mut self, label: &str) -> Option<PageId> {
        let Some(id) = self.get(label) else {
            log::warn!("page not found: {}", label);
            return None;
        };
        Some(self.change_to_page(id))
    }

    pub fn change_to_page(&mut self, id: PageId) -> PageId {
        if self.current == Some(id) {
            self.pages[id.0].events.trigger("reshow", &PageSignal::Reshow);
            return id;
        }

        self.dialogs.hide_for_page_change();

        if let Some(prev) = self.current.take() {
            let page = &mut self.pages[prev.0];
            page.events.trigger("hide", &PageSignal::Hide);
            page.visible = false;
        }

        let page = &mut self.pages[id.0];
        page.visible = true;
        page.events.trigger("show", &PageSignal::Show);
        let label = page.label.clone();
        self.current = Some(id);
        log::debug!("page changed to {}", label);

        let has_sidebar = self.has_sidebar();
        self.events.trigger("scroll-top", &ContainerEvent::ScrollTop);
        self.events
            .trigger("page-change", &ContainerEvent::PageChange { label, has_sidebar });
        self.events.trigger("breadcrumbs", &ContainerEvent::Breadcrumbs);
        id
    }

    pub fn has_sidebar(&self) -> bool {
        self.current_page().is_some_and(|page| {
            page.double_column
                .unwrap_or_else(|| page.content.has_sidebar())
        })
    }
}
