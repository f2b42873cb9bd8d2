pub mod document;
pub mod metadata;
pub mod rpc;
