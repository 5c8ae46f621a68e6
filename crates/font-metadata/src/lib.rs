//! Metadata stamped onto the merged font (metrics, names, vendor, version).

mod metrics;
mod naming;
mod vendor;
mod version;

use anyhow::{Context, Result};

pub use metrics::VerticalMetrics;
pub use naming::FontNaming;
pub use vendor::Vendor;
pub use version::{BuildTimestamp, FontVersion};

/// All metadata of one output font.
#[derive(Debug, Clone)]
pub struct FontMetadata {
    pub metrics: VerticalMetrics,
    pub naming: FontNaming,
    pub vendor: Vendor,
    pub version: FontVersion,
    pub timestamp: BuildTimestamp,
}

impl FontMetadata {
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let data = self.metrics.apply(data).context("Failed to set vertical metrics")?;
        let data = self.naming.apply(&data).context("Failed to set names")?;
        let data = self.vendor.apply(&data).context("Failed to set vendor id")?;
        let data = self.version.apply(&data).context("Failed to set font revision")?;
        self.timestamp.apply(&data).context("Failed to set timestamp")
    }
}
