//! Route handlers, thin wrappers over the engine façade

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use posture_engine::{
    Alert, AuditEntry, ComplianceSummary, EngineError, ExportDocument, Incident, IncidentArchetype,
    IncidentRequest, RiskAssessment, SolutionKind, TrendReport,
};

use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/compliance-summary", get(compliance_summary))
        .route("/controls", get(list_controls))
        .route("/risk-assessment", get(risk_assessment))
        .route("/alerts", get(active_alerts))
        .route("/incidents", get(list_incidents))
        .route("/compliance-trends", get(trends))
        .route("/non-compliant-controls", get(non_compliant_controls))
        .route("/audit-log", get(audit_log))
        .route("/force-incident", post(force_incident))
        .route("/implement-solution", post(implement_solution))
        .route("/resolve-incident", post(resolve_incident))
        .route("/update-control", post(update_control))
        .route("/acknowledge-alert", post(acknowledge_alert))
        .route("/trigger-simulation", post(trigger_simulation))
        .route("/export", post(export_report))
}

/// Json extractor whose rejection carries the standard error body
/// instead of axum's plain-text default.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Engine error carried into an HTTP response
pub enum ApiError {
    Engine(EngineError),
    UnknownArchetype(String),
    BadBody(JsonRejection),
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self::Engine(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            Self::Engine(error) => {
                let status = match &error {
                    EngineError::ControlNotFound(_)
                    | EngineError::IncidentNotFound(_)
                    | EngineError::AlertNotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::InvalidSolution(_) | EngineError::InvalidTransition { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.kind(), error.to_string())
            }
            Self::UnknownArchetype(name) => (
                StatusCode::BAD_REQUEST,
                "invalid_archetype",
                format!("unknown incident archetype: {name}"),
            ),
            Self::BadBody(rejection) => {
                (rejection.status(), "invalid_request", rejection.body_text())
            }
        };

        let body = ErrorBody {
            success: false,
            error: kind.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

async fn compliance_summary(State(engine): State<ApiState>) -> Json<ComplianceSummary> {
    Json(engine.compliance_summary())
}

async fn list_controls(State(engine): State<ApiState>) -> Json<Vec<ControlSummary>> {
    Json(engine.list_controls().into_iter().map(Into::into).collect())
}

async fn risk_assessment(State(engine): State<ApiState>) -> Json<RiskAssessment> {
    Json(engine.risk_assessment())
}

async fn active_alerts(State(engine): State<ApiState>) -> Json<Vec<Alert>> {
    Json(engine.active_alerts())
}

async fn list_incidents(State(engine): State<ApiState>) -> Json<Vec<Incident>> {
    Json(engine.list_incidents())
}

async fn trends(State(engine): State<ApiState>) -> Json<TrendReport> {
    Json(engine.trends())
}

async fn non_compliant_controls(
    State(engine): State<ApiState>,
) -> Json<Vec<NonCompliantControl>> {
    Json(
        engine
            .non_compliant_controls()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

async fn audit_log(State(engine): State<ApiState>) -> Json<Vec<AuditEntry>> {
    Json(engine.audit_log())
}

async fn force_incident(
    State(engine): State<ApiState>,
    body: Option<Json<ForceIncidentRequest>>,
) -> Result<Json<IncidentResponse>, ApiError> {
    let request = match body {
        Some(Json(body)) => {
            let archetype = body
                .archetype
                .map(|name| {
                    name.parse::<IncidentArchetype>()
                        .map_err(ApiError::UnknownArchetype)
                })
                .transpose()?;
            IncidentRequest {
                archetype,
                severity: body.severity,
                targets: body.targets,
                description: None,
            }
        }
        None => IncidentRequest::random(),
    };

    let incident = engine.create_incident(request)?;
    let active_alerts = engine.active_alerts().len();
    Ok(Json(IncidentResponse {
        success: true,
        incident,
        active_alerts,
    }))
}

async fn implement_solution(
    State(engine): State<ApiState>,
    Json(body): Json<SolutionRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    let solution: SolutionKind = body.solution_type.parse()?;
    let control = engine.apply_solution(&body.control_id, solution)?;
    Ok(Json(ControlResponse {
        success: true,
        control: control.into(),
    }))
}

async fn resolve_incident(
    State(engine): State<ApiState>,
    Json(body): Json<ResolveIncidentRequest>,
) -> Result<Json<IncidentResponse>, ApiError> {
    let incident = engine.resolve_incident(&body.incident_id)?;
    let active_alerts = engine.active_alerts().len();
    Ok(Json(IncidentResponse {
        success: true,
        incident,
        active_alerts,
    }))
}

async fn update_control(
    State(engine): State<ApiState>,
    Json(body): Json<UpdateControlRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    let control = engine.update_status(&body.control_id, body.status, &body.notes)?;
    Ok(Json(ControlResponse {
        success: true,
        control: control.into(),
    }))
}

async fn acknowledge_alert(
    State(engine): State<ApiState>,
    Json(body): Json<AcknowledgeAlertRequest>,
) -> Result<Json<AlertResponse>, ApiError> {
    let alert = engine.acknowledge_alert(&body.alert_id)?;
    Ok(Json(AlertResponse {
        success: true,
        alert,
    }))
}

async fn trigger_simulation(
    State(engine): State<ApiState>,
) -> Result<Json<TickResponse>, ApiError> {
    let report = engine.tick()?;
    Ok(Json(TickResponse {
        success: true,
        report,
    }))
}

async fn export_report(
    State(engine): State<ApiState>,
    body: Option<Json<ExportRequest>>,
) -> Result<Json<ExportResponse>, ApiError> {
    let document = ExportDocument::capture(&engine);
    let path = match body.and_then(|Json(b)| b.path) {
        Some(path) => std::path::PathBuf::from(path),
        None => std::path::PathBuf::from(document.default_filename()),
    };
    let written = document.write_to(&path)?;
    Ok(Json(ExportResponse {
        success: true,
        path: written.display().to_string(),
    }))
}
