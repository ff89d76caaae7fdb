//! Alert raising and acknowledgment

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{Alert, AlertSource, RiskLevel};
use crate::state::EngineState;
use crate::{EngineError, EngineResult};

/// Append a new active alert and return it
pub(crate) fn raise(
    state: &mut EngineState,
    source: AlertSource,
    severity: RiskLevel,
    title: &str,
    message: &str,
    related_id: &str,
    now: DateTime<Utc>,
) -> Alert {
    let alert = Alert {
        alert_id: Uuid::new_v4(),
        title: title.to_string(),
        message: message.to_string(),
        source,
        severity,
        related_id: related_id.to_string(),
        created_at: now,
        acknowledged: false,
    };
    tracing::info!(alert_id = %alert.alert_id, ?source, title, "alert raised");
    state.alerts.push(alert.clone());
    alert
}

/// Unacknowledged alerts, oldest first
pub(crate) fn list_active(state: &EngineState) -> Vec<Alert> {
    state
        .alerts
        .iter()
        .filter(|a| !a.acknowledged)
        .cloned()
        .collect()
}

/// Acknowledge by id. Explicit and caller-driven only; a resolved cause
/// never acknowledges its alert automatically. Idempotent on an already
/// acknowledged alert.
pub(crate) fn acknowledge(state: &mut EngineState, alert_id: &str) -> EngineResult<Alert> {
    let id: Uuid = alert_id
        .parse()
        .map_err(|_| EngineError::AlertNotFound(alert_id.to_string()))?;
    let alert = state
        .alerts
        .iter_mut()
        .find(|a| a.alert_id == id)
        .ok_or_else(|| EngineError::AlertNotFound(alert_id.to_string()))?;
    alert.acknowledged = true;
    Ok(alert.clone())
}
