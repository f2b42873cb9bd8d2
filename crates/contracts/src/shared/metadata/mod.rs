//! Metadata types describing doctypes and their fields
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contracts::shared::metadata::{DocField, DocTypeMeta, FieldType};
//!
//! let meta = DocTypeMeta::new("Task", vec![
//!     DocField::new("subject", FieldType::Data).with_label("Subject"),
//!     DocField::new("qty", FieldType::Int).with_depends_on("subject"),
//! ]);
//! for df in meta.sort_docfields() {
//!     println!("{}: {}", df.fieldname, df.fieldtype.as_str());
//! }
//! ```

mod depends;
mod field_type;
mod types;

pub use depends::{DependsCallback, DependsOn};
pub use field_type::FieldType;
pub use types::{DocField, DocFieldProperty, DocTypeMeta};
