//! Engine façade: the single synchronization boundary

use chrono::Utc;
use parking_lot::RwLock;

use crate::config::SimulationConfig;
use crate::drift::{run_tick, TickReport};
use crate::incidents::{self, IncidentRequest};
use crate::metrics::{self, ComplianceSummary, RiskAssessment, TrendReport};
use crate::model::{Alert, ComplianceStatus, Control, Incident, TransitionCause};
use crate::remediation::{self, SolutionKind};
use crate::state::EngineState;
use crate::audit::{AuditEntry, IntegrityResult};
use crate::{alerts, catalog, EngineResult};

/// Compliance posture engine. Every external read and write goes through
/// this façade; mutations take the write lock for one bounded in-memory
/// pass and reads clone consistent snapshots under the read lock. Raw
/// references to the state never escape.
pub struct PostureEngine {
    state: RwLock<EngineState>,
}

impl PostureEngine {
    /// Engine seeded with the built-in ISO 27001 / PCI DSS catalog
    pub fn new(config: SimulationConfig) -> Self {
        let controls = catalog::builtin_controls(Utc::now());
        Self::with_controls(config, controls)
    }

    /// Engine with the built-in catalog reset to not-assessed
    pub fn unassessed(config: SimulationConfig) -> Self {
        let controls = catalog::unassessed_controls(Utc::now());
        Self::with_controls(config, controls)
    }

    /// Engine over an explicit control set
    pub fn with_controls(config: SimulationConfig, controls: Vec<Control>) -> Self {
        Self {
            state: RwLock::new(EngineState::new(config, controls)),
        }
    }

    pub fn config(&self) -> SimulationConfig {
        self.state.read().config.clone()
    }

    // --- registry ---

    pub fn get_control(&self, control_id: &str) -> EngineResult<Control> {
        self.state.read().get(control_id)
    }

    /// All controls in insertion order
    pub fn list_controls(&self) -> Vec<Control> {
        self.state.read().list()
    }

    /// Controls whose status is anything but compliant
    pub fn non_compliant_controls(&self) -> Vec<Control> {
        self.state
            .read()
            .controls
            .iter()
            .filter(|c| c.status != ComplianceStatus::Compliant)
            .cloned()
            .collect()
    }

    /// Manual assessment of a control's status
    pub fn update_status(
        &self,
        control_id: &str,
        status: ComplianceStatus,
        evidence_note: &str,
    ) -> EngineResult<Control> {
        let mut state = self.state.write();
        state.transition(
            control_id,
            status,
            TransitionCause::Assessment,
            "operator",
            evidence_note,
            Utc::now(),
        )?;
        state.get(control_id)
    }

    pub fn adjust_automation(&self, control_id: &str, delta: f64) -> EngineResult<Control> {
        self.state.write().adjust_automation(control_id, delta)
    }

    pub fn adjust_drift(&self, control_id: &str, delta: f64) -> EngineResult<Control> {
        self.state.write().adjust_drift(control_id, delta)
    }

    // --- incidents ---

    pub fn create_incident(&self, request: IncidentRequest) -> EngineResult<Incident> {
        incidents::create(&mut self.state.write(), request, Utc::now())
    }

    /// Random archetype incident, the force-incident path
    pub fn force_incident(&self) -> EngineResult<Incident> {
        self.create_incident(IncidentRequest::random())
    }

    pub fn resolve_incident(&self, incident_id: &str) -> EngineResult<Incident> {
        incidents::resolve(&mut self.state.write(), incident_id, Utc::now())
    }

    /// Incidents in creation order
    pub fn list_incidents(&self) -> Vec<Incident> {
        self.state.read().incidents.clone()
    }

    // --- alerts ---

    pub fn active_alerts(&self) -> Vec<Alert> {
        alerts::list_active(&self.state.read())
    }

    /// Full alert history, acknowledged included
    pub fn alert_history(&self) -> Vec<Alert> {
        self.state.read().alerts.clone()
    }

    pub fn acknowledge_alert(&self, alert_id: &str) -> EngineResult<Alert> {
        alerts::acknowledge(&mut self.state.write(), alert_id)
    }

    // --- remediation ---

    pub fn apply_solution(&self, control_id: &str, solution: SolutionKind) -> EngineResult<Control> {
        remediation::apply(&mut self.state.write(), control_id, solution, Utc::now())
    }

    // --- metrics ---

    pub fn compliance_summary(&self) -> ComplianceSummary {
        let state = self.state.read();
        metrics::compliance_summary(&state.controls, Utc::now())
    }

    pub fn risk_assessment(&self) -> RiskAssessment {
        metrics::risk_assessment(&self.state.read().controls)
    }

    pub fn trends(&self) -> TrendReport {
        let state = self.state.read();
        metrics::trends(&state.controls, &state.incidents, &state.alerts)
    }

    // --- audit ---

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.read().audit.entries().to_vec()
    }

    pub fn verify_audit_integrity(&self) -> IntegrityResult {
        self.state.read().audit.verify_integrity()
    }

    // --- simulation ---

    /// Apply one tick atomically. The tick runs against a working copy of
    /// the state and is swapped in only on success, so readers either see
    /// the full tick or none of it.
    pub fn tick(&self) -> EngineResult<TickReport> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let report = run_tick(&mut next, Utc::now())?;
        *guard = next;
        Ok(report)
    }
}
