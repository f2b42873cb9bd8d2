//! Modal dialogs over a field group
//!
//! The dialog's display flags live in a shared cell so the page container
//! can hide (or minimize) whatever dialog is open when the page changes,
//! without owning the dialog itself.

use super::field_group::FieldGroup;
use super::layout::LayoutError;
use crate::shared::events::EventBus;
use crate::shared::messages::{Indicator, Message, MessageLog};
use contracts::shared::metadata::DocField;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialogState {
    pub display: bool,
    /// Survives page changes.
    pub keep_open: bool,
    pub minimizable: bool,
    pub minimized: bool,
}

impl DialogState {
    /// What a page change does to this dialog.
    fn on_page_change(&mut self) {
        if !self.display || self.keep_open {
            return;
        }
        if self.minimizable {
            self.minimized = true;
        } else {
            self.display = false;
        }
    }
}

type SharedState = Rc<Cell<DialogState>>;

/// The most recently shown dialog, as seen by the page container.
#[derive(Clone, Default)]
pub struct DialogSlot {
    current: Rc<RefCell<Option<SharedState>>>,
}

impl DialogSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, state: SharedState) {
        *self.current.borrow_mut() = Some(state);
    }

    pub fn current(&self) -> Option<DialogState> {
        self.current.borrow().as_ref().map(|s| s.get())
    }

    /// Hide or minimize the open dialog unless it asked to stay open.
    pub fn hide_for_page_change(&self) {
        if let Some(state) = self.current.borrow().as_ref() {
            let mut next = state.get();
            next.on_page_change();
            if next != state.get() {
                log::debug!("dialog dismissed by page change");
            }
            state.set(next);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Show,
    Hide,
}

pub struct Dialog {
    pub title: String,
    pub primary_action_label: Option<String>,
    field_group: FieldGroup,
    state: SharedState,
    pub events: EventBus<DialogEvent>,
}

impl Dialog {
    pub fn new(title: impl Into<String>, fields: Vec<DocField>) -> Self {
        Self {
            title: title.into(),
            primary_action_label: None,
            field_group: FieldGroup::new(fields),
            state: Rc::new(Cell::new(DialogState::default())),
            events: EventBus::new(),
        }
    }

    pub fn with_primary_action(mut self, label: impl Into<String>) -> Self {
        self.primary_action_label = Some(label.into());
        self
    }

    pub fn keep_open(self, keep_open: bool) -> Self {
        self.update(|s| s.keep_open = keep_open);
        self
    }

    pub fn minimizable(self, minimizable: bool) -> Self {
        self.update(|s| s.minimizable = minimizable);
        self
    }

    fn update(&self, f: impl FnOnce(&mut DialogState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }

    pub fn state(&self) -> DialogState {
        self.state.get()
    }

    pub fn is_visible(&self) -> bool {
        let state = self.state.get();
        state.display && !state.minimized
    }

    pub fn fields(&self) -> &FieldGroup {
        &self.field_group
    }

    pub fn fields_mut(&mut self) -> &mut FieldGroup {
        &mut self.field_group
    }

    pub fn show(&mut self, slot: &DialogSlot) -> Result<(), LayoutError> {
        self.field_group.make()?;
        self.update(|s| {
            s.display = true;
            s.minimized = false;
        });
        slot.set(self.state.clone());
        self.events.trigger("show", &DialogEvent::Show);
        Ok(())
    }

    pub fn hide(&mut self) {
        self.update(|s| s.display = false);
        self.events.trigger("hide", &DialogEvent::Hide);
    }

    pub fn toggle_minimize(&mut self) {
        if self.state.get().minimizable {
            self.update(|s| s.minimized = !s.minimized);
        }
    }

    pub fn get_value(&self, fieldname: &str) -> Value {
        self.field_group.get_value(fieldname)
    }

    pub fn set_value(&mut self, fieldname: &str, value: Value) -> Result<(), LayoutError> {
        self.field_group.set_value(fieldname, value)
    }

    /// Values for the primary action; missing mandatory values are
    /// reported on `messages` instead.
    pub fn primary_action(&self, messages: &MessageLog) -> Option<Map<String, Value>> {
        match self.field_group.get_values(false) {
            Ok(values) => Some(values),
            Err(LayoutError::MissingValues(labels)) => {
                messages.show(Message {
                    title: "Missing Values Required".into(),
                    message: format!("Following fields have missing values: {}", labels.join(", ")),
                    indicator: Indicator::Orange,
                    blocking: false,
                });
                None
            }
            Err(err) => {
                messages.throw("Error", &err.to_string());
                None
            }
        }
    }
}
