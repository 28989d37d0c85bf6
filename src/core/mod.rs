pub mod document;
pub mod events;
pub mod report;
pub mod runtime;
pub mod scenario;
pub mod search_redirect;
pub mod selector;

pub use crate::domain::model::{EventRecord, NodeId, PageSnapshot};
pub use crate::domain::ports::PageHook;
pub use crate::utils::error::Result;
