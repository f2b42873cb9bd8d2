use std::collections::HashMap;

/// What to do with the window title after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleAction {
    /// A title was recorded for this route before; it has been applied.
    Applied(String),
    /// Capture whatever title is current after `delay_ms`.
    Capture { route: String, delay_ms: u32 },
}

/// Window titles remembered per decoded route string.
#[derive(Debug, Default)]
pub struct TitleCache {
    titles: HashMap<String, String>,
}

impl TitleCache {
    pub fn get(&self, route: &str) -> Option<&str> {
        self.titles.get(route).map(String::as_str)
    }

    pub fn record(&mut self, route: &str, title: &str) {
        if title.is_empty() {
            return;
        }
        self.titles.insert(route.to_string(), title.to_string());
    }
}
