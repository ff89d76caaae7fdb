//! Drift tick logic and the periodic scheduler

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::PostureEngine;
use crate::incidents::{self, IncidentRequest};
use crate::model::{clamp_unit, AlertSource, ComplianceStatus, RiskLevel, TransitionCause};
use crate::state::EngineState;
use crate::{alerts, EngineResult};

/// What a single tick did
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub drift_breaches: usize,
    pub promotions: usize,
    pub overdue_alerts: usize,
    pub incidents_created: usize,
}

/// Advance every control by one tick. Runs against a working copy of the
/// state; the caller swaps the copy in only on success, so a failed tick
/// never exposes partial updates.
pub(crate) fn run_tick(state: &mut EngineState, now: DateTime<Utc>) -> EngineResult<TickReport> {
    let mut report = TickReport::default();

    for idx in 0..state.controls.len() {
        let (control_id, status, risk_level) = {
            let control = &mut state.controls[idx];
            let days_since_review = (now - control.last_review_date).num_days().max(0) as f64;
            let increment = state.config.drift_base_rate
                * (1.0 - control.automation_level)
                * (1.0 + days_since_review / 30.0);
            control.drift_factor = clamp_unit(control.drift_factor + increment);
            (control.control_id.clone(), control.status, control.risk_level)
        };

        let drift = state.controls[idx].drift_factor;
        let breached = drift >= state.config.drift_threshold;

        if breached && status == ComplianceStatus::Compliant {
            state.transition(
                &control_id,
                ComplianceStatus::NonCompliant,
                TransitionCause::DriftBreach,
                "scheduler",
                "drift factor crossed breach threshold",
                now,
            )?;
            alerts::raise(
                state,
                AlertSource::Drift,
                risk_level,
                &format!("Compliance drift detected: {control_id}"),
                &format!("Control {control_id} drifted past the breach threshold"),
                &control_id,
                now,
            );
            report.drift_breaches += 1;

            if state.config.synthesize_drift_incidents {
                let severity = match risk_level {
                    RiskLevel::Critical | RiskLevel::High => RiskLevel::Medium,
                    _ => RiskLevel::Low,
                };
                incidents::record(
                    state,
                    "Compliance Drift Breach",
                    &format!("Control {control_id} degraded without review"),
                    severity,
                    vec![control_id.clone()],
                    now,
                )?;
                report.incidents_created += 1;
            }
        } else if status == ComplianceStatus::InProgress
            && state.eligible_for_promotion(&control_id)?
        {
            state.transition(
                &control_id,
                ComplianceStatus::Compliant,
                TransitionCause::Promotion,
                "scheduler",
                "recovery verified, drift under threshold and no open incident",
                now,
            )?;
            report.promotions += 1;
        }

        let overdue = state.controls[idx].next_review_date < now.date_naive();
        if overdue && !state.has_active_alert(AlertSource::OverdueReview, &control_id) {
            alerts::raise(
                state,
                AlertSource::OverdueReview,
                RiskLevel::Medium,
                &format!("Overdue review: {control_id}"),
                &format!("Control {control_id} is past its review date"),
                &control_id,
                now,
            );
            report.overdue_alerts += 1;
        }
    }

    if state.config.incident_probability > 0.0
        && state.rng.gen::<f64>() < state.config.incident_probability
    {
        incidents::create(state, IncidentRequest::random(), now)?;
        report.incidents_created += 1;
    }

    state.tick_count += 1;
    report.tick = state.tick_count;
    Ok(report)
}

/// Periodic background task driving the simulation
pub struct DriftScheduler {
    engine: Arc<PostureEngine>,
    period: Duration,
}

impl DriftScheduler {
    /// Scheduler with the period from the engine's config
    pub fn new(engine: Arc<PostureEngine>) -> Self {
        let period = engine.config().tick_period;
        Self { engine, period }
    }

    pub fn with_period(engine: Arc<PostureEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// Run ticks forever on the runtime. A failed tick is logged and the
    /// loop continues; readers never see its partial effects.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(period_secs = self.period.as_secs(), "drift scheduler started");
            loop {
                ticker.tick().await;
                match self.engine.tick() {
                    Ok(report) => tracing::debug!(
                        tick = report.tick,
                        breaches = report.drift_breaches,
                        promotions = report.promotions,
                        "tick applied"
                    ),
                    Err(error) => tracing::error!(%error, "tick failed, state unchanged"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::SimulationConfig;
    use crate::remediation::{self, SolutionKind};

    fn state(config: SimulationConfig) -> EngineState {
        EngineState::new(config, catalog::builtin_controls(Utc::now()))
    }

    #[test]
    fn drift_grows_faster_without_automation() {
        let mut state = state(SimulationConfig::deterministic(5));
        let manual_before = state.get("A.5.1.1").unwrap().drift_factor; // automation 0.3
        let automated_before = state.get("PCI.2.1").unwrap().drift_factor; // automation 0.9

        run_tick(&mut state, Utc::now()).unwrap();

        let manual_gain = state.get("A.5.1.1").unwrap().drift_factor - manual_before;
        let automated_gain = state.get("PCI.2.1").unwrap().drift_factor - automated_before;
        assert!(manual_gain > automated_gain);
    }

    #[test]
    fn breach_fires_exactly_one_drift_alert() {
        let mut state = state(SimulationConfig::deterministic(5));
        state.adjust_automation("A.5.1.1", -1.0).unwrap();

        let now = Utc::now();
        for _ in 0..50 {
            run_tick(&mut state, now).unwrap();
        }

        let control = state.get("A.5.1.1").unwrap();
        assert_eq!(control.status, ComplianceStatus::NonCompliant);
        assert!(control.drift_factor >= state.config.drift_threshold);

        let drift_alerts: Vec<_> = state
            .alerts
            .iter()
            .filter(|a| a.source == AlertSource::Drift && a.related_id == "A.5.1.1")
            .collect();
        assert_eq!(drift_alerts.len(), 1);
    }

    #[test]
    fn breach_can_synthesize_an_incident() {
        let mut config = SimulationConfig::deterministic(5);
        config.synthesize_drift_incidents = true;
        let mut state = state(config);
        state.adjust_automation("A.5.1.1", -1.0).unwrap();

        let now = Utc::now();
        for _ in 0..50 {
            run_tick(&mut state, now).unwrap();
        }

        let synthesized: Vec<_> = state
            .incidents
            .iter()
            .filter(|i| i.affected_controls == vec!["A.5.1.1".to_string()])
            .collect();
        assert_eq!(synthesized.len(), 1);
        // A.5.1.1 is high risk, so the synthesized incident is medium
        assert_eq!(synthesized[0].severity, RiskLevel::Medium);
        assert_eq!(state.get("A.5.1.1").unwrap().incident_count, 1);
    }

    #[test]
    fn overdue_review_alert_is_idempotent() {
        let mut state = state(SimulationConfig::deterministic(5));
        let now = Utc::now();
        for _ in 0..10 {
            run_tick(&mut state, now).unwrap();
        }

        // A.8.1.1 starts past its review date
        let overdue: Vec<_> = state
            .alerts
            .iter()
            .filter(|a| a.source == AlertSource::OverdueReview && a.related_id == "A.8.1.1")
            .collect();
        assert_eq!(overdue.len(), 1);
    }

    #[test]
    fn remediated_control_is_promoted_on_a_later_tick() {
        let mut state = state(SimulationConfig::deterministic(5));
        let now = Utc::now();

        remediation::apply(&mut state, "PCI.2.1", SolutionKind::Technology, now).unwrap();
        assert_eq!(state.get("PCI.2.1").unwrap().status, ComplianceStatus::InProgress);

        run_tick(&mut state, now).unwrap();
        assert_eq!(state.get("PCI.2.1").unwrap().status, ComplianceStatus::Compliant);
    }

    #[test]
    fn unresolved_incident_blocks_promotion() {
        let mut state = state(SimulationConfig::deterministic(5));
        let now = Utc::now();

        let incident = incidents::create(
            &mut state,
            IncidentRequest {
                archetype: Some(catalog::IncidentArchetype::FailedPasswordAudit),
                severity: None,
                targets: Some(vec!["PCI.2.1".into()]),
                description: None,
            },
            now,
        )
        .unwrap();

        remediation::apply(&mut state, "PCI.2.1", SolutionKind::Technology, now).unwrap();
        run_tick(&mut state, now).unwrap();
        assert_eq!(state.get("PCI.2.1").unwrap().status, ComplianceStatus::InProgress);

        incidents::resolve(&mut state, &incident.incident_id, now).unwrap();
        run_tick(&mut state, now).unwrap();
        assert_eq!(state.get("PCI.2.1").unwrap().status, ComplianceStatus::Compliant);
    }

    #[test]
    fn tick_counter_advances() {
        let mut state = state(SimulationConfig::deterministic(5));
        let report = run_tick(&mut state, Utc::now()).unwrap();
        assert_eq!(report.tick, 1);
        let report = run_tick(&mut state, Utc::now()).unwrap();
        assert_eq!(report.tick, 2);
    }
}
