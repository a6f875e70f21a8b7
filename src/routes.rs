// feedback-report-service/src/routes.rs

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::credentials::CredentialBatch;
use crate::error::{ReportError, Result};
use crate::models::{AnalysisSelector, FeedbackSubmission, GeneratedDocument, ReportSelector, Scope};
use crate::pipeline::ReportPipeline;

pub const DEPARTMENT_HEADER: &str = "x-department-id";
pub const USERNAME_HEADER: &str = "x-username";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: ReportPipeline,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(DEPARTMENT_HEADER),
            HeaderName::from_static(USERNAME_HEADER),
        ])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/feedback-generator/pdf", get(feedback_pdf_handler))
        .route("/api/feedback-generator/excel", get(feedback_matrix_handler))
        .route("/api/feedback-generator/teacher-subjects", get(teacher_subjects_handler))
        .route("/api/teacher-analysis/academic-years", get(analysis_years_handler))
        .route("/api/teacher-analysis/teachers", get(analysis_teachers_handler))
        .route("/api/teacher-analysis/subjects", get(analysis_subjects_handler))
        .route("/api/teacher-analysis/data", get(teacher_analysis_handler))
        .route("/api/student-login/generate-pdf", post(generate_logins_handler))
        .route("/api/student-login/delete-login", delete(delete_logins_handler))
        .route("/api/feedback/submit", post(submit_feedback_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================
// Caller identity
// ============================================================

/// Identity forwarded by the authenticating proxy in front of the service.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    department_id: Option<i32>,
    username: Option<String>,
}

impl Caller {
    pub fn department_id(&self) -> Result<i32> {
        self.department_id
            .ok_or_else(|| ReportError::Validation("Missing or invalid department header".into()))
    }

    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .ok_or_else(|| ReportError::Validation("Missing username header".into()))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ReportError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Caller {
            department_id: header(DEPARTMENT_HEADER).and_then(|v| v.parse().ok()),
            username: header(USERNAME_HEADER),
        })
    }
}

// ============================================================
// Request parsing
// ============================================================

fn required<T: FromStr>(value: &Option<String>, name: &str) -> Result<T> {
    let raw = value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReportError::Validation(format!("Missing required parameter {name}")))?;

    raw.parse()
        .map_err(|_| ReportError::Validation(format!("Invalid value for {name}: {raw}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub teacher_subject_id: Option<String>,
    pub academic_year: Option<String>,
    pub student_year: Option<String>,
    pub semester: Option<String>,
}

impl ReportQuery {
    pub fn selector(&self, department_id: i32) -> Result<ReportSelector> {
        Ok(ReportSelector {
            department_id,
            teacher_subject_id: required(&self.teacher_subject_id, "teacher_subject_id")?,
            academic_year: required(&self.academic_year, "academic_year")?,
            student_year: required(&self.student_year, "student_year")?,
            semester: required(&self.semester, "semester")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub teacher_id: Option<String>,
    pub academic_year: Option<String>,
    pub teacher_subject_id: Option<String>,
}

impl AnalysisQuery {
    pub fn selector(&self, department_id: i32) -> Result<AnalysisSelector> {
        let academic_year: String = required(&self.academic_year, "academic_year")?;
        let teacher_subject: String = required(&self.teacher_subject_id, "teacher_subject_id")?;

        Ok(AnalysisSelector {
            department_id,
            teacher_id: required(&self.teacher_id, "teacher_id")?,
            teacher_subject: Scope::parse(&teacher_subject).map_err(|_| {
                ReportError::Validation(format!("Invalid value for teacher_subject_id: {teacher_subject}"))
            })?,
            academic_year: Scope::parse(&academic_year)
                .map_err(|_| ReportError::Validation("Invalid academic_year".into()))?,
        })
    }
}

/// Picker filters. `academic_year` may be `All`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisPickerQuery {
    pub academic_year: Option<String>,
    pub teacher_id: Option<String>,
}

impl AnalysisPickerQuery {
    pub fn academic_year(&self) -> Result<Scope<String>> {
        let raw: String = required(&self.academic_year, "academic_year")?;
        Scope::parse(&raw).map_err(|_| ReportError::Validation("Invalid academic_year".into()))
    }

    pub fn teacher_id(&self) -> Result<i64> {
        required(&self.teacher_id, "teacher_id")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TeacherSubjectsQuery {
    pub academic_year: Option<String>,
    pub year: Option<String>,
}

/// Accepts `2` as well as `"2"`; form fields arrive as strings.
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Int(i64),
        Text(String),
    }

    match Option::<Lenient>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Int(v)) => Ok(Some(v)),
        Some(Lenient::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Lenient::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateLoginsRequest {
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub semester: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub count: Option<i64>,
}

impl GenerateLoginsRequest {
    pub fn batch(&self, department_id: i32) -> Result<CredentialBatch> {
        let (Some(academic_year), Some(semester), Some(year), Some(count)) =
            (self.academic_year.as_deref(), self.semester, self.year, self.count)
        else {
            return Err(ReportError::Validation("All fields required".into()));
        };

        let narrow = |value: i64, name: &str| {
            i32::try_from(value).map_err(|_| ReportError::Validation(format!("Invalid value for {name}")))
        };
        let count = usize::try_from(count)
            .map_err(|_| ReportError::Validation("Count must be at least 1".into()))?;

        CredentialBatch::new(
            department_id,
            narrow(year, "year")?,
            narrow(semester, "semester")?,
            academic_year,
            count,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteLoginsQuery {
    #[serde(default = "default_used_only")]
    pub used_only: bool,
}

fn default_used_only() -> bool {
    true
}

// ============================================================
// Handlers
// ============================================================

fn pdf_response(document: GeneratedDocument) -> Result<Response> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
        .map_err(|e| ReportError::Render(format!("Invalid filename {}: {e}", document.filename)))?;
    let content_type = HeaderValue::from_str(&document.mime_type)
        .map_err(|e| ReportError::Render(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, disposition)],
        document.content,
    )
        .into_response())
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn feedback_pdf_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Response> {
    let selector = query.selector(caller.department_id()?)?;
    let document = state.pipeline.feedback_report(selector).await?;
    pdf_response(document)
}

async fn feedback_matrix_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Response> {
    let selector = query.selector(caller.department_id()?)?;
    let matrix = state.pipeline.feedback_matrix(selector).await?;
    Ok(Json(json!({ "success": true, "data": matrix })).into_response())
}

async fn teacher_subjects_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<TeacherSubjectsQuery>,
) -> Result<Response> {
    let department_id = caller.department_id()?;
    let academic_year: String = required(&query.academic_year, "academic_year")?;
    let year: i32 = required(&query.year, "year")?;

    let rows = state
        .pipeline
        .teacher_subjects(department_id, &academic_year, year)
        .await?;
    Ok(Json(json!({ "success": true, "teacher_subjects": rows })).into_response())
}

async fn analysis_years_handler(State(state): State<AppState>, caller: Caller) -> Result<Response> {
    let years = state.pipeline.analysis_years(caller.department_id()?).await?;
    Ok(Json(json!({ "success": true, "years": years })).into_response())
}

async fn analysis_teachers_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AnalysisPickerQuery>,
) -> Result<Response> {
    let department_id = caller.department_id()?;
    let teachers = state
        .pipeline
        .analysis_teachers(department_id, query.academic_year()?)
        .await?;
    Ok(Json(json!({ "success": true, "teachers": teachers })).into_response())
}

async fn analysis_subjects_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AnalysisPickerQuery>,
) -> Result<Response> {
    let department_id = caller.department_id()?;
    let teacher_id = query.teacher_id()?;
    let subjects = state
        .pipeline
        .analysis_subjects(department_id, teacher_id, query.academic_year()?)
        .await?;
    Ok(Json(json!({ "success": true, "subjects": subjects })).into_response())
}

async fn teacher_analysis_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response> {
    let selector = query.selector(caller.department_id()?)?;
    let analysis = state.pipeline.teacher_analysis(selector).await?;
    Ok(Json(json!({ "success": true, "data": analysis })).into_response())
}

async fn generate_logins_handler(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<GenerateLoginsRequest>,
) -> Result<Response> {
    let batch = request.batch(caller.department_id()?)?;
    let document = state.pipeline.credential_sheet(batch).await?;
    pdf_response(document)
}

async fn delete_logins_handler(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<DeleteLoginsQuery>,
) -> Result<Response> {
    let department_id = caller.department_id()?;
    let deleted = state
        .pipeline
        .delete_credentials(department_id, query.used_only)
        .await?;

    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "message": format!("{deleted} student logins deleted"),
    }))
    .into_response())
}

async fn submit_feedback_handler(
    State(state): State<AppState>,
    caller: Caller,
    Json(submission): Json<FeedbackSubmission>,
) -> Result<Response> {
    let username = caller.username()?.to_string();
    let submission_id: Uuid = submission.submission_id;

    let answers = state.pipeline.submit_feedback(&username, submission).await?;
    info!(%submission_id, answers, "Submission stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "submission_id": submission_id, "answers": answers })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_query_requires_every_field() {
        let query = ReportQuery {
            teacher_subject_id: Some("12".into()),
            academic_year: Some("2025-2026".into()),
            student_year: Some("2".into()),
            semester: None,
        };
        assert!(matches!(query.selector(1), Err(ReportError::Validation(_))));

        let query = ReportQuery {
            semester: Some("1".into()),
            ..query
        };
        let selector = query.selector(4).unwrap();
        assert_eq!(selector.department_id, 4);
        assert_eq!(selector.teacher_subject_id, 12);
        assert_eq!(selector.semester, 1);
    }

    #[test]
    fn analysis_query_understands_all() {
        let query = AnalysisQuery {
            teacher_id: Some("3".into()),
            academic_year: Some("All".into()),
            teacher_subject_id: Some("All".into()),
        };
        let selector = query.selector(1).unwrap();
        assert_eq!(selector.teacher_subject, Scope::All);
        assert_eq!(selector.academic_year, Scope::All);

        let query = AnalysisQuery {
            teacher_subject_id: Some("nine".into()),
            ..query
        };
        assert!(matches!(query.selector(1), Err(ReportError::Validation(_))));
    }

    #[test]
    fn picker_query_needs_a_year() {
        let query = AnalysisPickerQuery {
            academic_year: Some("All".into()),
            teacher_id: Some("7".into()),
        };
        assert_eq!(query.academic_year().unwrap(), Scope::All);
        assert_eq!(query.teacher_id().unwrap(), 7);

        let query = AnalysisPickerQuery::default();
        assert!(matches!(query.academic_year(), Err(ReportError::Validation(_))));
        assert!(matches!(query.teacher_id(), Err(ReportError::Validation(_))));
    }

    #[test]
    fn login_request_accepts_strings_and_numbers() {
        let request: GenerateLoginsRequest = serde_json::from_value(json!({
            "academic_year": "2025-2026",
            "semester": "1",
            "year": 2,
            "count": "5"
        }))
        .unwrap();

        let batch = request.batch(1).unwrap();
        assert_eq!(batch.count, 5);
        assert_eq!(batch.pattern.prefix(), "SECS1");

        let missing: GenerateLoginsRequest = serde_json::from_value(json!({ "year": 2 })).unwrap();
        assert!(matches!(missing.batch(1), Err(ReportError::Validation(_))));
    }
}
