//! Scan record model.
//!
//! A `ScanRecord` is the validated output of one vision analysis. The serde
//! field names are the camelCase contract the model is instructed to emit,
//! which is also the shape stored in the remote `scan_data` column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analyzed item: disposal guidance plus the eco-points it awards.
///
/// Immutable once created. The `id` and `timestamp` are always generated
/// client-side at analysis time, never taken from the model's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Client-generated identifier, `scan_<epoch-millis>`.
    pub id: String,
    /// Client-generated creation time (serialized as ISO-8601).
    pub timestamp: DateTime<Utc>,
    /// Common name of the main item in the image.
    pub item_name: String,
    /// Concise disposal method (Recycle, Trash, Compost, E-Waste, ...).
    pub disposal_method: String,
    /// A sustainable alternative to the item.
    pub alternative: String,
    /// A creative reuse or upcycle idea.
    pub upcycling_idea: String,
    /// A short eco-friendly tip related to the item.
    pub eco_tip: String,
    /// Points awarded for scanning this item.
    pub eco_points: u32,
}

impl ScanRecord {
    /// Formats an identifier for a scan created at `created_at`.
    pub fn id_for(created_at: DateTime<Utc>) -> String {
        format!("scan_{}", created_at.timestamp_millis())
    }
}
