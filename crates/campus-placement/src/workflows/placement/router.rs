use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::domain::{Actor, ApplicationId, CompanyId, JobId, Role, StudentId};
use super::repository::{NotificationDispatcher, PlacementRepository, RepositoryError};
use super::service::{PlacementError, PlacementService};
use super::validation::{
    ApplicationQuery, ApplyRequest, CompanyQuery, JobUpdateRequest, NewCollegeRequest,
    NewJobRequest, NewStudentRequest, StatusUpdateRequest, StudentProfileUpdate,
    StudentRecordUpdate,
};

pub const ROLE_HEADER: &str = "x-portal-role";
pub const USER_HEADER: &str = "x-portal-user";

/// Router builder exposing the portal endpoints for every role.
pub fn placement_router<R, N>(service: Arc<PlacementService<R, N>>) -> Router
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/student/jobs", get(eligible_jobs_handler::<R, N>))
        .route(
            "/api/v1/student/profile",
            get(student_profile_handler::<R, N>).patch(update_student_profile_handler::<R, N>),
        )
        .route(
            "/api/v1/student/applications",
            get(student_applications_handler::<R, N>).post(apply_handler::<R, N>),
        )
        .route(
            "/api/v1/company/jobs",
            get(company_jobs_handler::<R, N>).post(post_job_handler::<R, N>),
        )
        .route(
            "/api/v1/company/jobs/:job_id",
            patch(update_job_handler::<R, N>),
        )
        .route(
            "/api/v1/company/applications",
            get(company_applications_handler::<R, N>),
        )
        .route(
            "/api/v1/company/applications/:application_id/status",
            patch(update_status_handler::<R, N>),
        )
        .route(
            "/api/v1/college/placements",
            get(college_placements_handler::<R, N>),
        )
        .route(
            "/api/v1/college/students",
            get(college_students_handler::<R, N>),
        )
        .route("/api/v1/students", post(register_student_handler::<R, N>))
        .route(
            "/api/v1/admin/colleges",
            get(list_colleges_handler::<R, N>).post(create_college_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/companies",
            get(list_companies_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/students/:student_id",
            patch(update_student_handler::<R, N>),
        )
        .route(
            "/api/v1/admin/companies/:company_id/approve",
            post(approve_company_handler::<R, N>),
        )
        .route("/api/v1/admin/analytics", get(analytics_handler::<R, N>))
        .route_layer(middleware::from_fn(authenticate))
        .route("/api/v1/jobs/public", get(public_jobs_handler::<R, N>))
        .with_state(service)
}

/// Resolves the caller identity forwarded by the session layer.
pub(crate) async fn authenticate(mut request: Request, next: Next) -> Response {
    match actor_from_headers(request.headers()) {
        Some(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        None => {
            warn!(path = %request.uri().path(), "missing or invalid caller identity");
            PlacementError::Unauthorized.into_response()
        }
    }
}

fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let role = headers
        .get(ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(Role::parse)?;
    let id = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())?;
    Some(Actor::new(role, id))
}

pub(crate) async fn eligible_jobs_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let jobs = service.eligible_jobs(&actor, Utc::now())?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn student_profile_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let student = service.student_profile(&actor)?;
    Ok(Json(json!({ "student": student })))
}

pub(crate) async fn update_student_profile_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<StudentProfileUpdate>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let student = service.update_student_profile(&actor, request)?;
    Ok(Json(json!({
        "message": "profile updated successfully",
        "student": student,
    })))
}

pub(crate) async fn public_jobs_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let jobs = service.public_jobs(Utc::now())?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn student_applications_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let applications = service.student_applications(&actor)?;
    Ok(Json(json!({ "applications": applications })))
}

pub(crate) async fn apply_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ApplyRequest>,
) -> Result<Response, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let application = service.apply(&actor, request, Utc::now())?;
    let payload = json!({
        "message": "application submitted successfully",
        "application": application,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn company_jobs_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let jobs = service.company_jobs(&actor)?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn post_job_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<NewJobRequest>,
) -> Result<Response, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let outcome = service.post_job(&actor, request, Utc::now())?;
    let payload = json!({
        "message": "job created successfully",
        "job": outcome.job,
        "notified_students": outcome.notified_students,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn update_job_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Path(job_id): Path<String>,
    Json(request): Json<JobUpdateRequest>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let job = service.update_job(&actor, &JobId(job_id), request)?;
    Ok(Json(json!({ "message": "job updated successfully", "job": job })))
}

pub(crate) async fn company_applications_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let applications = service.company_applications(&actor, &query)?;
    Ok(Json(json!({ "applications": applications })))
}

pub(crate) async fn update_status_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let application =
        service.update_status(&actor, &ApplicationId(application_id), request, Utc::now())?;
    Ok(Json(json!({
        "message": "application status updated successfully",
        "application": application,
    })))
}

pub(crate) async fn college_placements_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let placements = service.college_placements(&actor)?;
    Ok(Json(json!({ "placements": placements })))
}

pub(crate) async fn college_students_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let students = service.college_students(&actor)?;
    Ok(Json(json!({ "students": students })))
}

pub(crate) async fn register_student_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<NewStudentRequest>,
) -> Result<Response, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let student = service.register_student(&actor, request)?;
    Ok((StatusCode::CREATED, Json(json!({ "student": student }))).into_response())
}

pub(crate) async fn approve_company_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Path(company_id): Path<String>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let company = service.approve_company(&actor, &CompanyId(company_id))?;
    Ok(Json(json!({ "message": "company approved", "company": company })))
}

pub(crate) async fn list_colleges_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let colleges = service.list_colleges(&actor)?;
    Ok(Json(json!({ "colleges": colleges })))
}

pub(crate) async fn create_college_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<NewCollegeRequest>,
) -> Result<Response, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let college = service.create_college(&actor, request)?;
    let payload = json!({
        "message": "college created successfully",
        "college": college,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn list_companies_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let companies = service.list_companies(&actor, &query)?;
    Ok(Json(json!({ "companies": companies })))
}

pub(crate) async fn update_student_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
    Path(student_id): Path<String>,
    Json(request): Json<StudentRecordUpdate>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let student = service.update_student(&actor, &StudentId(student_id), request)?;
    Ok(Json(json!({
        "message": "student updated successfully",
        "student": student,
    })))
}

pub(crate) async fn analytics_handler<R, N>(
    State(service): State<Arc<PlacementService<R, N>>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, PlacementError>
where
    R: PlacementRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    let analytics = service.analytics(&actor)?;
    Ok(Json(json!(analytics)))
}

impl PlacementError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlacementError::Validation(_) | PlacementError::InvalidTransition(_) => {
                StatusCode::BAD_REQUEST
            }
            PlacementError::Eligibility(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlacementError::AlreadyApplied
            | PlacementError::DuplicateStudent
            | PlacementError::DuplicateCollege => StatusCode::CONFLICT,
            PlacementError::NotFound { .. } | PlacementError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            PlacementError::Unauthorized => StatusCode::UNAUTHORIZED,
            PlacementError::Forbidden(_) => StatusCode::FORBIDDEN,
            PlacementError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PlacementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "placement request failed");
        }

        let payload = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(payload)).into_response()
    }
}
