//! Compliance Posture Simulation Engine
//!
//! Simulates and serves the live compliance posture of an organization
//! against ISO 27001 and PCI DSS. Controls drift out of compliance over
//! time, simulated incidents force them non-compliant, and typed
//! solutions claw them back. Every read sees a consistent point-in-time
//! snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      POSTURE ENGINE                             │
//! │                                                                 │
//! │  ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌────────────┐  │
//! │  │   Drift   │  │ Incident  │  │Remediation │  │   Alert    │  │
//! │  │ Scheduler │  │  Engine   │  │   Engine   │  │  Manager   │  │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬──────┘  └─────┬──────┘  │
//! │        │              │              │               │         │
//! │  ┌─────▼──────────────▼──────────────▼───────────────▼──────┐  │
//! │  │            CONTROL REGISTRY (single write lock)          │  │
//! │  │     Status State Machine | Audit Chain | RNG Source      │  │
//! │  └──────────────────────────┬───────────────────────────────┘  │
//! │                             │                                  │
//! │  ┌──────────────────────────▼───────────────────────────────┐  │
//! │  │        METRICS (pure, over read-locked snapshots)        │  │
//! │  │   Percentages | Risk Histograms | Trends | Export Doc    │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod alerts;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod drift;
pub mod engine;
pub mod export;
pub mod incidents;
pub mod metrics;
pub mod model;
pub mod remediation;

mod state;

use thiserror::Error;

pub use audit::{AuditEntry, IntegrityResult};
pub use catalog::IncidentArchetype;
pub use config::SimulationConfig;
pub use drift::{DriftScheduler, TickReport};
pub use engine::PostureEngine;
pub use export::ExportDocument;
pub use incidents::IncidentRequest;
pub use metrics::{ComplianceSummary, RiskAssessment, StandardSummary, TrendReport};
pub use model::{
    Alert, AlertSource, ComplianceStatus, Control, Incident, RiskLevel, Standard, TransitionCause,
};
pub use remediation::SolutionKind;

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown control id
    #[error("control not found: {0}")]
    ControlNotFound(String),

    /// Unknown incident id
    #[error("incident not found: {0}")]
    IncidentNotFound(String),

    /// Unknown alert id
    #[error("alert not found: {0}")]
    AlertNotFound(String),

    /// Solution type outside the fixed set
    #[error("invalid solution type: {0}")]
    InvalidSolution(String),

    /// Status edge not permitted by the state machine
    #[error("invalid status transition: {from} -> {to} ({cause})")]
    InvalidTransition {
        from: ComplianceStatus,
        to: ComplianceStatus,
        cause: TransitionCause,
    },

    /// Snapshot export failed
    #[error("export failed: {0}")]
    Export(String),
}

impl EngineError {
    /// Stable machine-readable kind for the API failure shape
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ControlNotFound(_) | Self::IncidentNotFound(_) | Self::AlertNotFound(_) => {
                "not_found"
            }
            Self::InvalidSolution(_) => "invalid_solution",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Export(_) => "export_failed",
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
