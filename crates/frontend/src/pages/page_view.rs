//! Standard pages, addressed by the first route segment alone

use super::container::{PageContainer, PageContent, PageId};
use super::factory::{make_page, show_not_found};
use crate::config::RouterConfig;
use std::collections::HashMap;

type PageBuilder = Box<dyn Fn(&str) -> PageContent>;

pub struct PageView {
    home_page: String,
    builders: HashMap<String, PageBuilder>,
}

/// Builder for a page with fixed content and a title.
fn standard(title: &'static str) -> impl Fn(&str) -> PageContent {
    move |name| PageContent::Standard {
        name: name.to_string(),
        title: title.to_string(),
    }
}

impl PageView {
    pub fn new(home_page: &str) -> Self {
        Self {
            home_page: home_page.to_string(),
            builders: HashMap::new(),
        }
    }

    /// Home and modules pages registered under their configured names.
    pub fn with_defaults(config: &RouterConfig) -> Self {
        let mut view = Self::new(&config.home_page);
        view.register(&config.home_page, standard("Home"));
        view.register(&config.modules_route, standard("Modules"));
        view
    }

    pub fn register(&mut self, name: &str, builder: impl Fn(&str) -> PageContent + 'static) {
        self.builders.insert(name.to_string(), Box::new(builder));
    }

    pub fn show(&self, name: &str, container: &mut PageContainer) -> PageId {
        let name = if name.is_empty() {
            self.home_page.as_str()
        } else {
            name
        };
        if let Some(id) = container.get(name) {
            return container.change_to_page(id);
        }
        match self.builders.get(name) {
            Some(build) => {
                let content = build(name);
                let id = make_page(container, false, name, content);
                if let PageContent::Standard { title, .. } = &container.page(id).content {
                    let title = title.clone();
                    container.page_mut(id).title = title;
                }
                id
            }
            None => show_not_found(container, name),
        }
    }
}
