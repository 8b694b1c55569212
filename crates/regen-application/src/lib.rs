//! Application services: the session state store and the scan orchestrator.

pub mod orchestrator;
pub mod store;

pub use orchestrator::ScanOrchestrator;
pub use store::{AppStore, StoreSnapshot};
