//! Solution application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{clamp_unit, ComplianceStatus, Control, TransitionCause};
use crate::state::EngineState;
use crate::{EngineError, EngineResult};

/// Typed corrective action with fixed policy deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionKind {
    Automation,
    Training,
    PolicyUpdate,
    Technology,
    Process,
}

impl SolutionKind {
    /// Automation level delta applied by this solution
    pub fn automation_delta(&self) -> f64 {
        match self {
            Self::Automation => 0.15,
            Self::Training => 0.05,
            Self::PolicyUpdate => 0.05,
            Self::Technology => 0.20,
            Self::Process => 0.10,
        }
    }

    /// Drift factor delta applied by this solution (always a reduction)
    pub fn drift_delta(&self) -> f64 {
        match self {
            Self::Automation => -0.20,
            Self::Training => -0.10,
            Self::PolicyUpdate => -0.15,
            Self::Technology => -0.25,
            Self::Process => -0.15,
        }
    }

    /// Note recorded on the control
    pub fn description(&self) -> &'static str {
        match self {
            Self::Automation => "Automated monitoring and enforcement implemented",
            Self::Training => "Staff training and awareness program completed",
            Self::PolicyUpdate => "Updated policies and procedures implemented",
            Self::Technology => "New security technology deployed",
            Self::Process => "Improved security processes implemented",
        }
    }
}

impl std::str::FromStr for SolutionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automation" => Ok(Self::Automation),
            "training" => Ok(Self::Training),
            "policy_update" => Ok(Self::PolicyUpdate),
            "technology" => Ok(Self::Technology),
            "process" => Ok(Self::Process),
            other => Err(EngineError::InvalidSolution(other.to_string())),
        }
    }
}

impl std::fmt::Display for SolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automation => write!(f, "automation"),
            Self::Training => write!(f, "training"),
            Self::PolicyUpdate => write!(f, "policy_update"),
            Self::Technology => write!(f, "technology"),
            Self::Process => write!(f, "process"),
        }
    }
}

/// Apply a solution: adjust automation and drift by the solution's fixed
/// deltas (clamped), then stage a non-compliant control to in-progress.
/// Promotion back to compliant happens on a later tick or re-assessment.
/// Safe to re-apply; deltas saturate at the [0, 1] bounds.
pub(crate) fn apply(
    state: &mut EngineState,
    control_id: &str,
    solution: SolutionKind,
    now: DateTime<Utc>,
) -> EngineResult<Control> {
    let idx = state.control_index(control_id)?;

    {
        let control = &mut state.controls[idx];
        control.automation_level = clamp_unit(control.automation_level + solution.automation_delta());
        control.drift_factor = clamp_unit(control.drift_factor + solution.drift_delta());
        control.notes = format!("Solution: {}", solution.description());
    }

    if state.controls[idx].status == ComplianceStatus::NonCompliant {
        state.transition(
            control_id,
            ComplianceStatus::InProgress,
            TransitionCause::Remediation,
            "operator",
            &format!("solution applied: {solution}"),
            now,
        )?;
    }

    tracing::info!(control_id, %solution, "solution applied");
    Ok(state.controls[idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::SimulationConfig;

    fn state() -> EngineState {
        EngineState::new(
            SimulationConfig::deterministic(3),
            catalog::builtin_controls(Utc::now()),
        )
    }

    #[test]
    fn solution_stages_through_in_progress() {
        let mut state = state();
        // PCI.2.1 starts non-compliant with automation 0.9
        let control = apply(&mut state, "PCI.2.1", SolutionKind::Automation, Utc::now()).unwrap();
        assert_eq!(control.status, ComplianceStatus::InProgress);
        assert!((control.automation_level - 1.0).abs() < 1e-9); // 0.9 + 0.15 clamps
        assert!(control.drift_factor.abs() < 1e-9); // 0.05 - 0.20 clamps
    }

    #[test]
    fn solution_on_compliant_control_only_adjusts_levels() {
        let mut state = state();
        let before = state.get("A.5.1.1").unwrap();
        let control = apply(&mut state, "A.5.1.1", SolutionKind::Training, Utc::now()).unwrap();
        assert_eq!(control.status, ComplianceStatus::Compliant);
        assert!((control.automation_level - (before.automation_level + 0.05)).abs() < 1e-9);
        assert!((control.drift_factor - (before.drift_factor - 0.10).max(0.0)).abs() < 1e-9);
    }

    #[test]
    fn reapplying_a_solution_saturates() {
        let mut state = state();
        for _ in 0..20 {
            apply(&mut state, "PCI.2.1", SolutionKind::Technology, Utc::now()).unwrap();
        }
        let control = state.get("PCI.2.1").unwrap();
        assert_eq!(control.automation_level, 1.0);
        assert_eq!(control.drift_factor, 0.0);
    }

    #[test]
    fn unknown_control_is_not_found() {
        let mut state = state();
        assert!(matches!(
            apply(&mut state, "X.0.0", SolutionKind::Process, Utc::now()),
            Err(EngineError::ControlNotFound(_))
        ));
    }

    #[test]
    fn unknown_solution_string_is_invalid() {
        let err = "prayer".parse::<SolutionKind>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidSolution(_)));
        assert_eq!("policy_update".parse::<SolutionKind>().unwrap(), SolutionKind::PolicyUpdate);
    }
}
