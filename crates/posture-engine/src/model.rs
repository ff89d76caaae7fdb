//! Core compliance entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Compliance standard a control is tracked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Standard {
    #[serde(rename = "ISO27001")]
    Iso27001,
    #[serde(rename = "PCI_DSS")]
    PciDss,
}

impl Standard {
    /// Both supported standards, in reporting order
    pub const ALL: [Standard; 2] = [Standard::Iso27001, Standard::PciDss];
}

impl std::fmt::Display for Standard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso27001 => write!(f, "ISO 27001"),
            Self::PciDss => write!(f, "PCI DSS"),
        }
    }
}

/// Risk level, doubling as incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Fixed bucket order for histograms
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Weight used in the aggregate risk score
    pub fn weight(&self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Compliance status of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    InProgress,
    NotAssessed,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::NonCompliant => write!(f, "non_compliant"),
            Self::InProgress => write!(f, "in_progress"),
            Self::NotAssessed => write!(f, "not_assessed"),
        }
    }
}

/// Cause of a status transition, used to validate state machine edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Manual or simulated assessment
    Assessment,
    /// Incident impact, always forces non-compliance
    Incident,
    /// Drift factor crossed the breach threshold
    DriftBreach,
    /// A solution was applied
    Remediation,
    /// Recovery verified, control promoted back to compliant
    Promotion,
}

impl std::fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assessment => write!(f, "assessment"),
            Self::Incident => write!(f, "incident"),
            Self::DriftBreach => write!(f, "drift_breach"),
            Self::Remediation => write!(f, "remediation"),
            Self::Promotion => write!(f, "promotion"),
        }
    }
}

/// A single compliance requirement tracked against one standard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub control_id: String,
    pub title: String,
    pub description: String,
    pub standard: Standard,
    pub status: ComplianceStatus,
    pub risk_level: RiskLevel,
    /// Fraction of enforcement that is automated, in [0, 1]
    pub automation_level: f64,
    /// Accumulated risk of silent degradation, in [0, 1]
    pub drift_factor: f64,
    pub responsible_team: String,
    pub last_review_date: DateTime<Utc>,
    pub next_review_date: NaiveDate,
    /// Incidents ever affecting this control; only increases
    pub incident_count: u32,
    pub notes: String,
}

impl Control {
    /// Whether the control counts as a high-risk issue when non-compliant
    pub fn is_high_risk(&self) -> bool {
        matches!(self.risk_level, RiskLevel::Critical | RiskLevel::High)
    }
}

/// A discrete simulated security event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    pub title: String,
    pub description: String,
    pub severity: RiskLevel,
    /// Non-empty; every id exists in the registry
    pub affected_controls: Vec<String>,
    pub occurrence_time: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// What raised an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSource {
    Incident,
    Drift,
    OverdueReview,
}

/// A derived, acknowledgeable notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: Uuid,
    pub title: String,
    pub message: String,
    pub source: AlertSource,
    pub severity: RiskLevel,
    /// Control or incident id this alert refers to
    pub related_id: String,
    pub created_at: DateTime<Utc>,
    pub acknowledged: bool,
}

/// Clamp a level or factor to its [0, 1] domain
pub(crate) fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
