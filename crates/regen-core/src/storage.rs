//! Local key-value storage trait.

use crate::error::Result;

/// Small persistent string store for process-local preferences.
///
/// Writes are synchronous: when `set` returns, the value is durable. Only
/// the theme preference and the cached session live here; everything else
/// is owned remotely.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value for `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` if present.
    fn remove(&self, key: &str) -> Result<()>;
}
