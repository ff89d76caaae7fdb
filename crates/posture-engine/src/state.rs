//! Shared engine state and the control registry

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audit::AuditChain;
use crate::config::SimulationConfig;
use crate::model::{
    clamp_unit, Alert, AlertSource, ComplianceStatus, Control, Incident, TransitionCause,
};
use crate::{EngineError, EngineResult};

/// The single shared mutable state block. All components mutate it under
/// one write lock; readers clone snapshots out of it.
#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    pub config: SimulationConfig,
    pub controls: Vec<Control>,
    index: HashMap<String, usize>,
    pub incidents: Vec<Incident>,
    pub alerts: Vec<Alert>,
    pub audit: AuditChain,
    pub rng: StdRng,
    pub incident_seq: u64,
    pub tick_count: u64,
}

impl EngineState {
    pub fn new(config: SimulationConfig, controls: Vec<Control>) -> Self {
        let index = controls
            .iter()
            .enumerate()
            .map(|(i, c)| (c.control_id.clone(), i))
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            controls,
            index,
            incidents: Vec::new(),
            alerts: Vec::new(),
            audit: AuditChain::new(),
            rng,
            incident_seq: 0,
            tick_count: 0,
        }
    }

    pub fn control_index(&self, control_id: &str) -> EngineResult<usize> {
        self.index
            .get(control_id)
            .copied()
            .ok_or_else(|| EngineError::ControlNotFound(control_id.to_string()))
    }

    pub fn get(&self, control_id: &str) -> EngineResult<Control> {
        Ok(self.controls[self.control_index(control_id)?].clone())
    }

    /// Controls in insertion order
    pub fn list(&self) -> Vec<Control> {
        self.controls.clone()
    }

    /// Next time-ordered incident id
    pub fn next_incident_id(&mut self) -> String {
        self.incident_seq += 1;
        format!("INC-{:06}", self.incident_seq)
    }

    /// Any unresolved incident still targeting this control
    pub fn has_unresolved_incident(&self, control_id: &str) -> bool {
        self.incidents
            .iter()
            .any(|i| !i.resolved && i.affected_controls.iter().any(|c| c == control_id))
    }

    /// Active (unacknowledged) alert from the given source about the given id
    pub fn has_active_alert(&self, source: AlertSource, related_id: &str) -> bool {
        self.alerts
            .iter()
            .any(|a| !a.acknowledged && a.source == source && a.related_id == related_id)
    }

    /// A control may only re-enter compliant once its drift is back under
    /// the threshold and no unresolved incident still targets it.
    pub fn eligible_for_promotion(&self, control_id: &str) -> EngineResult<bool> {
        let control = &self.controls[self.control_index(control_id)?];
        Ok(control.drift_factor < self.config.drift_threshold
            && !self.has_unresolved_incident(control_id))
    }

    /// Apply a status transition, validating the edge against its cause.
    /// Same-status updates are accepted as no-ops. Every applied transition
    /// lands in the audit chain.
    pub fn transition(
        &mut self,
        control_id: &str,
        new_status: ComplianceStatus,
        cause: TransitionCause,
        actor: &str,
        note: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let idx = self.control_index(control_id)?;
        let old_status = self.controls[idx].status;
        if old_status == new_status {
            return Ok(());
        }

        if !edge_allowed(old_status, new_status, cause) {
            return Err(EngineError::InvalidTransition {
                from: old_status,
                to: new_status,
                cause,
            });
        }

        // Compliant is only re-entered with evidence of recovery.
        let entering_compliant =
            new_status == ComplianceStatus::Compliant && old_status == ComplianceStatus::InProgress;
        if entering_compliant && !self.eligible_for_promotion(control_id)? {
            return Err(EngineError::InvalidTransition {
                from: old_status,
                to: new_status,
                cause,
            });
        }

        let control = &mut self.controls[idx];
        control.status = new_status;
        if !note.is_empty() {
            control.notes = note.to_string();
        }
        if entering_compliant {
            control.last_review_date = now;
            control.next_review_date =
                (now + chrono::Duration::days(self.config.review_interval_days)).date_naive();
        }

        self.audit
            .record(now, control_id, old_status, new_status, cause, actor, note);
        tracing::debug!(control_id, %old_status, %new_status, %cause, "status transition");
        Ok(())
    }

    /// Shift the automation level, clamped to [0, 1]
    pub fn adjust_automation(&mut self, control_id: &str, delta: f64) -> EngineResult<Control> {
        let idx = self.control_index(control_id)?;
        let control = &mut self.controls[idx];
        control.automation_level = clamp_unit(control.automation_level + delta);
        Ok(control.clone())
    }

    /// Shift the drift factor, clamped to [0, 1]
    pub fn adjust_drift(&mut self, control_id: &str, delta: f64) -> EngineResult<Control> {
        let idx = self.control_index(control_id)?;
        let control = &mut self.controls[idx];
        control.drift_factor = clamp_unit(control.drift_factor + delta);
        Ok(control.clone())
    }
}

/// Status state machine, edges keyed by transition cause
fn edge_allowed(from: ComplianceStatus, to: ComplianceStatus, cause: TransitionCause) -> bool {
    use ComplianceStatus::*;
    use TransitionCause::*;

    match cause {
        Assessment => matches!(
            (from, to),
            (NotAssessed, InProgress | Compliant | NonCompliant) | (InProgress, Compliant)
        ),
        // An incident always overrides
        Incident => to == NonCompliant,
        DriftBreach => from == Compliant && to == NonCompliant,
        Remediation => from == NonCompliant && to == InProgress,
        Promotion => from == InProgress && to == Compliant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn state() -> EngineState {
        let now = Utc::now();
        EngineState::new(
            SimulationConfig::deterministic(1),
            catalog::builtin_controls(now),
        )
    }

    #[test]
    fn get_unknown_control_is_not_found() {
        let state = state();
        assert!(matches!(
            state.get("PCI.99.9"),
            Err(EngineError::ControlNotFound(_))
        ));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let ids: Vec<String> = state().list().into_iter().map(|c| c.control_id).collect();
        assert_eq!(
            ids,
            vec!["A.5.1.1", "A.6.1.1", "A.8.1.1", "PCI.1.1", "PCI.2.1", "PCI.3.4"]
        );
    }

    #[test]
    fn compliant_cannot_drop_via_assessment() {
        let mut state = state();
        let err = state
            .transition(
                "A.5.1.1",
                ComplianceStatus::NonCompliant,
                TransitionCause::Assessment,
                "operator",
                "",
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn non_compliant_cannot_skip_to_compliant() {
        let mut state = state();
        for cause in [
            TransitionCause::Assessment,
            TransitionCause::Promotion,
            TransitionCause::Remediation,
        ] {
            assert!(state
                .transition(
                    "PCI.2.1",
                    ComplianceStatus::Compliant,
                    cause,
                    "operator",
                    "",
                    Utc::now(),
                )
                .is_err());
        }
    }

    #[test]
    fn incident_overrides_any_status() {
        let mut state = state();
        for id in ["A.5.1.1", "A.6.1.1", "PCI.2.1"] {
            state
                .transition(
                    id,
                    ComplianceStatus::NonCompliant,
                    TransitionCause::Incident,
                    "simulator",
                    "incident impact",
                    Utc::now(),
                )
                .unwrap();
            assert_eq!(state.get(id).unwrap().status, ComplianceStatus::NonCompliant);
        }
    }

    #[test]
    fn same_status_update_is_a_noop() {
        let mut state = state();
        let before = state.audit.len();
        state
            .transition(
                "A.5.1.1",
                ComplianceStatus::Compliant,
                TransitionCause::Assessment,
                "operator",
                "",
                Utc::now(),
            )
            .unwrap();
        assert_eq!(state.audit.len(), before);
    }

    #[test]
    fn promotion_requires_low_drift() {
        let mut state = state();
        state.adjust_drift("A.6.1.1", 1.0).unwrap();
        // A.6.1.1 starts in progress; drift now saturated at 1.0
        assert!(state
            .transition(
                "A.6.1.1",
                ComplianceStatus::Compliant,
                TransitionCause::Promotion,
                "scheduler",
                "",
                Utc::now(),
            )
            .is_err());

        state.adjust_drift("A.6.1.1", -0.9).unwrap();
        state
            .transition(
                "A.6.1.1",
                ComplianceStatus::Compliant,
                TransitionCause::Promotion,
                "scheduler",
                "",
                Utc::now(),
            )
            .unwrap();
        assert_eq!(
            state.get("A.6.1.1").unwrap().status,
            ComplianceStatus::Compliant
        );
    }

    #[test]
    fn transitions_land_in_audit_chain() {
        let mut state = state();
        state
            .transition(
                "A.5.1.1",
                ComplianceStatus::NonCompliant,
                TransitionCause::Incident,
                "simulator",
                "firewall incident",
                Utc::now(),
            )
            .unwrap();
        let entries = state.audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].control_id, "A.5.1.1");
        assert_eq!(entries[0].cause, TransitionCause::Incident);
        assert!(state.audit.verify_integrity().valid);
    }

    #[test]
    fn adjustments_stay_clamped() {
        let mut state = state();
        let c = state.adjust_automation("A.5.1.1", 5.0).unwrap();
        assert_eq!(c.automation_level, 1.0);
        let c = state.adjust_drift("A.5.1.1", -5.0).unwrap();
        assert_eq!(c.drift_factor, 0.0);
    }
}
