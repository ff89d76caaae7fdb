//! Incident creation, impact application, and resolution

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::IncidentArchetype;
use crate::model::{AlertSource, ComplianceStatus, Incident, RiskLevel, TransitionCause};
use crate::state::EngineState;
use crate::{alerts, EngineError, EngineResult};

/// Parameters for incident creation. Unset fields are filled from a
/// randomly drawn archetype.
#[derive(Debug, Clone, Default)]
pub struct IncidentRequest {
    pub archetype: Option<IncidentArchetype>,
    pub severity: Option<RiskLevel>,
    pub targets: Option<Vec<String>>,
    pub description: Option<String>,
}

impl IncidentRequest {
    /// Fully random incident, as used by force-incident
    pub fn random() -> Self {
        Self::default()
    }
}

/// Create an incident and apply its impact: every affected control is
/// forced non-compliant, its incident counter bumped, and an alert raised.
pub(crate) fn create(
    state: &mut EngineState,
    request: IncidentRequest,
    now: DateTime<Utc>,
) -> EngineResult<Incident> {
    let archetype = request
        .archetype
        .unwrap_or_else(|| *IncidentArchetype::ALL.choose(&mut state.rng).unwrap());
    let severity = request.severity.unwrap_or_else(|| archetype.default_severity());

    let targets = match request.targets {
        Some(mut targets) => {
            if targets.is_empty() {
                return Err(EngineError::ControlNotFound("<empty target set>".into()));
            }
            for id in &targets {
                state.control_index(id)?;
            }
            // Affected controls form a set; repeated ids must not
            // multiply the impact.
            targets.sort();
            targets.dedup();
            targets
        }
        None => pick_targets(state, archetype)?,
    };

    let description = request
        .description
        .unwrap_or_else(|| format!("Simulated incident: {}", archetype.title()));
    record(state, archetype.title(), &description, severity, targets, now)
}

/// Record an incident with explicit fields and apply its impact. Targets
/// must already be validated against the registry.
pub(crate) fn record(
    state: &mut EngineState,
    title: &str,
    description: &str,
    severity: RiskLevel,
    targets: Vec<String>,
    now: DateTime<Utc>,
) -> EngineResult<Incident> {
    let incident = Incident {
        incident_id: state.next_incident_id(),
        title: title.to_string(),
        description: description.to_string(),
        severity,
        affected_controls: targets.clone(),
        occurrence_time: now,
        resolved: false,
        resolved_at: None,
    };

    for control_id in &targets {
        let idx = state.control_index(control_id)?;
        state.controls[idx].incident_count += 1;
        state.transition(
            control_id,
            ComplianceStatus::NonCompliant,
            TransitionCause::Incident,
            "simulator",
            &format!("affected by incident {}", incident.incident_id),
            now,
        )?;
        alerts::raise(
            state,
            AlertSource::Incident,
            severity,
            &format!("Incident impact: {control_id}"),
            &format!("Control affected by incident: {}", incident.title),
            &incident.incident_id,
            now,
        );
    }

    tracing::warn!(
        incident_id = %incident.incident_id,
        %severity,
        affected = ?incident.affected_controls,
        "incident created"
    );
    state.incidents.push(incident.clone());
    Ok(incident)
}

/// At least one control drawn at random from the archetype's candidate
/// pool, restricted to controls present in the registry.
fn pick_targets(
    state: &mut EngineState,
    archetype: IncidentArchetype,
) -> EngineResult<Vec<String>> {
    let known: Vec<&str> = archetype
        .candidate_controls()
        .iter()
        .copied()
        .filter(|id| state.control_index(id).is_ok())
        .collect();
    if known.is_empty() {
        return Err(EngineError::ControlNotFound(
            archetype.candidate_controls().join(","),
        ));
    }
    let count = state.rng.gen_range(1..=known.len());
    let mut picked: Vec<String> = known
        .choose_multiple(&mut state.rng, count)
        .map(|id| id.to_string())
        .collect();
    picked.sort();
    Ok(picked)
}

/// Mark an incident resolved. Idempotent for an already-resolved incident;
/// control status is untouched, recovery goes through remediation.
pub(crate) fn resolve(
    state: &mut EngineState,
    incident_id: &str,
    now: DateTime<Utc>,
) -> EngineResult<Incident> {
    let incident = state
        .incidents
        .iter_mut()
        .find(|i| i.incident_id == incident_id)
        .ok_or_else(|| EngineError::IncidentNotFound(incident_id.to_string()))?;

    if !incident.resolved {
        incident.resolved = true;
        incident.resolved_at = Some(now);
        tracing::info!(incident_id, "incident resolved");
    }
    Ok(incident.clone())
}
