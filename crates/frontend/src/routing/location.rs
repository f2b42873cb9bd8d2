use std::cell::RefCell;
use std::rc::Rc;

/// Current URL fragment, session history and document title.
pub trait Location {
    /// Fragment including any leading `#`.
    fn hash(&self) -> String;
    /// Navigate to a new fragment, adding a history entry.
    fn set_hash(&self, hash: &str);
    fn back(&self);
    fn title(&self) -> String;
    fn set_title(&self, title: &str);
}

pub type SharedLocation = Rc<dyn Location>;

#[derive(Default)]
struct MemoryInner {
    entries: Vec<String>,
    index: usize,
    title: String,
}

/// In-memory session history.
#[derive(Clone)]
pub struct MemoryLocation {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                entries: vec![initial.to_string()],
                index: 0,
                title: String::new(),
            })),
        }
    }

    /// Number of session history entries.
    pub fn history_len(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn hash(&self) -> String {
        let inner = self.inner.borrow();
        inner.entries.get(inner.index).cloned().unwrap_or_default()
    }

    fn set_hash(&self, hash: &str) {
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(hash.to_string());
        inner.index = keep;
    }

    fn back(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.index = inner.index.saturating_sub(1);
    }

    fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.inner.borrow_mut().title = title.to_string();
    }
}
