pub mod documents;
pub mod meta;
pub mod scripts;

pub use documents::{DocRef, DocumentStore};
pub use meta::MetaStore;
pub use scripts::ScriptManager;
