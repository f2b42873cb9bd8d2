//! User-facing message log (`msgprint`)

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Blue,
    Orange,
    Red,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub title: String,
    pub message: String,
    pub indicator: Indicator,
    /// Raised as an error: the current action was aborted.
    pub blocking: bool,
}

#[derive(Clone, Default)]
pub struct MessageLog {
    entries: Rc<RefCell<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn msgprint(&self, title: &str, message: &str) {
        self.show(Message {
            title: title.to_string(),
            message: message.to_string(),
            indicator: Indicator::Blue,
            blocking: false,
        });
    }

    /// Record an error that aborted the running action.
    pub fn throw(&self, title: &str, message: &str) {
        log::error!("{}: {}", title, message);
        self.show(Message {
            title: title.to_string(),
            message: message.to_string(),
            indicator: Indicator::Red,
            blocking: true,
        });
    }

    pub fn show(&self, message: Message) {
        self.entries.borrow_mut().push(message);
    }

    pub fn entries(&self) -> Vec<Message> {
        self.entries.borrow().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.entries.borrow().last().cloned()
    }

    pub fn dismiss(&self, index: usize) {
        let mut entries = self.entries.borrow_mut();
        if index < entries.len() {
            entries.remove(index);
        }
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
