//! Data types shared by the desk client: doctype metadata, documents and
//! the payloads exchanged with the backend.

pub mod shared;
pub mod system;
