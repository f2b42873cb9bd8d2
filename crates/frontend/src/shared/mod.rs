pub mod api;
pub mod events;
pub mod messages;
pub mod storage;
pub mod translate;
pub mod value;
