//! Request and response shapes

use posture_engine::{
    Alert, ComplianceStatus, Control, Incident, RiskLevel, Standard, TickReport,
};
use serde::{Deserialize, Serialize};

/// Control row for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSummary {
    pub control_id: String,
    pub title: String,
    pub standard: Standard,
    pub status: ComplianceStatus,
    pub risk_level: RiskLevel,
    pub responsible_team: String,
}

impl From<Control> for ControlSummary {
    fn from(c: Control) -> Self {
        Self {
            control_id: c.control_id,
            title: c.title,
            standard: c.standard,
            status: c.status,
            risk_level: c.risk_level,
            responsible_team: c.responsible_team,
        }
    }
}

/// Control needing attention, with remediation-relevant fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonCompliantControl {
    pub control_id: String,
    pub title: String,
    pub status: ComplianceStatus,
    pub risk_level: RiskLevel,
    pub automation_level: f64,
    pub incident_count: u32,
}

impl From<Control> for NonCompliantControl {
    fn from(c: Control) -> Self {
        Self {
            control_id: c.control_id,
            title: c.title,
            status: c.status,
            risk_level: c.risk_level,
            automation_level: c.automation_level,
            incident_count: c.incident_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForceIncidentRequest {
    pub archetype: Option<String>,
    pub severity: Option<RiskLevel>,
    pub targets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolutionRequest {
    pub control_id: String,
    pub solution_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveIncidentRequest {
    pub incident_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateControlRequest {
    pub control_id: String,
    pub status: ComplianceStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcknowledgeAlertRequest {
    pub alert_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentResponse {
    pub success: bool,
    pub incident: Incident,
    pub active_alerts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    pub control: ControlSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertResponse {
    pub success: bool,
    pub alert: Alert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResponse {
    pub success: bool,
    pub report: TickReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub path: String,
}

/// Failure shape for all engine-level errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}
