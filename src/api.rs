//! HTTP surface for the student records service.
//!
//! - `GET /api/students` – List every stored student.
//! - `GET /api/students/:id` – Fetch a single student.
//! - `POST /api/students` – Validate and store a new student; answers `201` with the new id.
//! - `PATCH /api/students/:id` – Validate and apply a partial update.
//! - `DELETE /api/students/:id` – Remove a student; responds `{ "success": true }`.
//! - `GET /health` – Report whether the storage backend answers.
//!
//! Every failure is answered with `{ "error": "<message>" }` and the status listed on
//! [`ApiError`]. Nothing is retried.

use crate::students::{
    StoreError, Student, StudentInput, StudentStore, ValidationError, validate_new,
    validate_patch,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the HTTP router over the given store.
pub fn create_router<S>(store: Arc<S>, cors_origin: HeaderValue) -> Router
where
    S: StudentStore + 'static,
{
    Router::new()
        .route(
            "/api/students",
            get(list_students::<S>).post(create_student::<S>),
        )
        .route(
            "/api/students/:id",
            get(get_student::<S>)
                .patch(update_student::<S>)
                .delete(delete_student::<S>),
        )
        .route("/health", get(health::<S>))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// CORS policy: one origin, the four CRUD verbs, and preflight.
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// List every stored student.
async fn list_students<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Student>>, ApiError>
where
    S: StudentStore,
{
    let students = store
        .list()
        .await
        .map_err(|error| ApiError::from_store(Operation::List, error))?;
    tracing::debug!(count = students.len(), "Listed students");
    Ok(Json(students))
}

/// Fetch one student by id.
async fn get_student<S>(
    State(store): State<Arc<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError>
where
    S: StudentStore,
{
    let id = store
        .parse_id(&raw_id)
        .map_err(|error| ApiError::from_store(Operation::Fetch, error))?;
    let student = store
        .find(&id)
        .await
        .map_err(|error| ApiError::from_store(Operation::Fetch, error))?;
    Ok(Json(student))
}

/// Validate and store a new student.
async fn create_student<S>(
    State(store): State<Arc<S>>,
    body: Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError>
where
    S: StudentStore,
{
    let Json(input) = body?;
    let student = validate_new(input)?;
    let created = store
        .insert(student)
        .await
        .map_err(|error| ApiError::from_store(Operation::Create, error))?;
    tracing::info!(id = %created.id, backend = store.backend(), "Student created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Validate and apply a partial update.
///
/// The id is checked first, then the body; a rejected patch never reaches the store.
async fn update_student<S>(
    State(store): State<Arc<S>>,
    Path(raw_id): Path<String>,
    body: Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<Student>, ApiError>
where
    S: StudentStore,
{
    let id = store
        .parse_id(&raw_id)
        .map_err(|error| ApiError::from_store(Operation::Update, error))?;
    let Json(input) = body?;
    let patch = validate_patch(input)?;
    let updated = store
        .find_and_update(&id, patch)
        .await
        .map_err(|error| ApiError::from_store(Operation::Update, error))?;
    tracing::info!(id = %updated.id, "Student updated");
    Ok(Json(updated))
}

/// Response body for a successful delete.
#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

/// Remove a student.
async fn delete_student<S>(
    State(store): State<Arc<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError>
where
    S: StudentStore,
{
    let id = store
        .parse_id(&raw_id)
        .map_err(|error| ApiError::from_store(Operation::Delete, error))?;
    store
        .delete(&id)
        .await
        .map_err(|error| ApiError::from_store(Operation::Delete, error))?;
    tracing::info!(id = %id, "Student deleted");
    Ok(Json(DeleteResponse { success: true }))
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Check that the storage backend answers.
///
/// Failure details are logged; the body only names the backend.
async fn health<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<HealthResponse>)
where
    S: StudentStore,
{
    let backend = store.backend();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                backend,
            }),
        ),
        Err(error) => {
            tracing::warn!(backend, error = %error, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    backend,
                }),
            )
        }
    }
}

/// Store operation named in `500` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/students`
    List,
    /// `GET /api/students/:id`
    Fetch,
    /// `POST /api/students`
    Create,
    /// `PATCH /api/students/:id`
    Update,
    /// `DELETE /api/students/:id`
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "List students",
            Self::Fetch => "Fetch student",
            Self::Create => "Create student",
            Self::Update => "Update student",
            Self::Delete => "Delete student",
        })
    }
}

/// Request failures and the responses they produce.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body was not valid JSON for a student (`400`).
    #[error("Invalid request body")]
    MalformedBody(#[from] JsonRejection),
    /// A field rule was violated (`400`).
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// Path id does not match the backend's id format (`400`).
    #[error("Invalid student ID")]
    InvalidId,
    /// No student has the requested id (`404`).
    #[error("Student not found")]
    NotFound,
    /// The store failed or timed out (`500`).
    #[error("{operation} failed")]
    Persistence {
        /// Operation that was attempted.
        operation: Operation,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Classify a store failure for the given operation.
    pub fn from_store(operation: Operation, error: StoreError) -> Self {
        match error {
            StoreError::InvalidId(_) => Self::InvalidId,
            StoreError::NotFound => Self::NotFound,
            source => Self::Persistence { operation, source },
        }
    }

    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) | Self::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Persistence { operation, source } => {
                tracing::error!(%operation, error = %source, "Store request failed");
            }
            Self::MalformedBody(rejection) => {
                tracing::debug!(rejection = %rejection.body_text(), "Rejected request body");
            }
            Self::Validation(error) => {
                tracing::debug!(
                    field = error.field.as_str(),
                    reason = ?error.reason,
                    "Validation failed"
                );
            }
            other => tracing::debug!(error = %other, "Request rejected"),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
