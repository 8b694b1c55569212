//! Scan orchestrator.
//!
//! Thin glue between the vision client and the state store: analyze the
//! image, award the points, record the scan. Points and history are written
//! independently, with no transactional coupling between them; a failure
//! after the points update leaves the accepted points/history skew.

use regen_core::{Result, ScanRecord};
use regen_inference::{ImageRef, VisionClient};
use std::sync::Arc;

use crate::store::AppStore;

/// Drives one scan end to end.
pub struct ScanOrchestrator {
    client: Arc<VisionClient>,
    store: Arc<AppStore>,
}

impl ScanOrchestrator {
    pub fn new(client: Arc<VisionClient>, store: Arc<AppStore>) -> Self {
        Self { client, store }
    }

    /// Analyzes `image` and feeds the result into the store.
    ///
    /// # Errors
    ///
    /// Analysis failure surfaces as [`regen_core::RegenError::AnalysisUnavailable`]
    /// with no state mutated. A failed history write propagates after the
    /// optimistic points award has already been applied.
    pub async fn scan(&self, image: &ImageRef) -> Result<ScanRecord> {
        let record = self.client.analyze_item(image).await?;
        tracing::info!(item = %record.item_name, points = record.eco_points, "Scan analyzed");

        self.store.award_points(record.eco_points).await;
        self.store.record_scan(record.clone()).await?;
        Ok(record)
    }
}
