//! Forms: layout engine, dependency evaluation, field groups and dialogs

pub mod column;
pub mod control;
pub mod depends;
pub mod dialog;
pub mod expr;
pub mod field;
pub mod field_group;
pub mod layout;
pub mod section;
pub mod tab;
pub mod view;

pub use dialog::{Dialog, DialogSlot};
pub use field_group::FieldGroup;
pub use layout::{Layout, LayoutError, LayoutOptions};
pub use view::{FormLayoutView, LayoutSnapshot};
