//! Write-once snapshot export

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::PostureEngine;
use crate::metrics::{ComplianceSummary, TrendReport};
use crate::model::{Alert, Control, Incident};
use crate::{EngineError, EngineResult};

/// Structured snapshot of the full posture at export time. Not intended
/// to be re-imported.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub summary: ComplianceSummary,
    pub trends: TrendReport,
    pub controls: Vec<Control>,
    pub incidents: Vec<Incident>,
    pub active_alerts: Vec<Alert>,
}

impl ExportDocument {
    /// Snapshot the engine. Each section is read under its own short read
    /// lock; no I/O happens while any lock is held.
    pub fn capture(engine: &PostureEngine) -> Self {
        Self {
            generated_at: Utc::now(),
            summary: engine.compliance_summary(),
            trends: engine.trends(),
            controls: engine.list_controls(),
            incidents: engine.list_incidents(),
            active_alerts: engine.active_alerts(),
        }
    }

    /// Default report filename, timestamped
    pub fn default_filename(&self) -> String {
        format!(
            "compliance_report_{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Serialize to pretty JSON and write to `path`
    pub fn write_to(&self, path: &Path) -> EngineResult<PathBuf> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Export(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| EngineError::Export(e.to_string()))?;
        tracing::info!(path = %path.display(), "compliance report exported");
        Ok(path.to_path_buf())
    }
}
