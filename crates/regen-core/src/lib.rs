pub mod error;
pub mod gateway;
pub mod profile;
pub mod scan;
pub mod session;
pub mod storage;
pub mod theme;

// Re-export common error type
pub use error::{RegenError, Result};
pub use gateway::BackendGateway;
pub use profile::Profile;
pub use scan::ScanRecord;
pub use session::Session;
pub use storage::KeyValueStore;
pub use theme::ThemePreference;
