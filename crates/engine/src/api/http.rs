//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use famtree_domain::{Event, EventId, Person, PersonId};

use crate::app::App;
use crate::use_cases::clear::ClearOutcome;
use crate::use_cases::fill::{parse_generations, FillError, FillOutcome, FillSummary};
use crate::use_cases::load::{LoadError, LoadOutcome, LoadRequest, LoadSummary};
use crate::use_cases::lookup::LookupError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/fill/{username}", post(fill_default))
        .route("/fill/{username}/{generations}", post(fill))
        .route("/person", get(list_persons))
        .route("/person/{person_id}", get(get_person))
        .route("/event", get(list_events))
        .route("/event/{event_id}", get(get_event))
        .route("/clear", post(clear))
        .route("/load", post(load))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Fill / Clear / Load
// =============================================================================

/// Rejected requests are 400; failures past validation are 500.
fn outcome_status(rejected: bool) -> StatusCode {
    if rejected {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn fill_response(result: Result<FillSummary, FillError>) -> (StatusCode, Json<FillOutcome>) {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => outcome_status(e.is_rejection()),
    };
    (status, Json(FillOutcome::from_result(&result)))
}

async fn fill_default(
    State(app): State<Arc<App>>,
    Path(username): Path<String>,
) -> (StatusCode, Json<FillOutcome>) {
    let result = app
        .use_cases
        .fill
        .fill
        .run(&username, app.default_generations)
        .await;
    fill_response(result)
}

async fn fill(
    State(app): State<Arc<App>>,
    Path((username, generations)): Path<(String, String)>,
) -> (StatusCode, Json<FillOutcome>) {
    let result = match parse_generations(&generations) {
        Ok(generations) => app.use_cases.fill.fill.run(&username, generations).await,
        Err(e) => {
            tracing::warn!(username = %username, generations = %generations, error = %e, "Fill failed");
            Err(e)
        }
    };
    fill_response(result)
}

fn load_response(result: Result<LoadSummary, LoadError>) -> (StatusCode, Json<LoadOutcome>) {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => outcome_status(e.is_rejection()),
    };
    (status, Json(LoadOutcome::from_result(&result)))
}

async fn load(
    State(app): State<Arc<App>>,
    payload: Result<Json<LoadRequest>, JsonRejection>,
) -> (StatusCode, Json<LoadOutcome>) {
    let result = match payload {
        Ok(Json(request)) => app.use_cases.load.run(request).await,
        Err(rejection) => {
            let e = LoadError::InvalidRequest(rejection.body_text());
            tracing::warn!(error = %e, "Load failed");
            Err(e)
        }
    };
    load_response(result)
}

async fn clear(State(app): State<Arc<App>>) -> (StatusCode, Json<ClearOutcome>) {
    let outcome = app.use_cases.clear.clear().await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome))
}

// =============================================================================
// Lookups
// =============================================================================

#[derive(Serialize)]
struct Found<T> {
    #[serde(flatten)]
    record: T,
    success: bool,
}

#[derive(Serialize)]
struct Listing<T> {
    data: Vec<T>,
    success: bool,
}

/// The raw token from the `Authorization` header, with an optional
/// `Bearer ` prefix removed.
fn auth_token(headers: &HeaderMap) -> &str {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim();
    raw.strip_prefix("Bearer ").unwrap_or(raw)
}

async fn list_persons(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Listing<Person>>, ApiError> {
    let data = app
        .use_cases
        .lookup
        .people
        .list(auth_token(&headers))
        .await?;
    Ok(Json(Listing {
        data,
        success: true,
    }))
}

async fn get_person(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(person_id): Path<String>,
) -> Result<Json<Found<Person>>, ApiError> {
    let id: PersonId = person_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid person id: {}", person_id)))?;
    let record = app
        .use_cases
        .lookup
        .people
        .get(auth_token(&headers), id)
        .await?;
    Ok(Json(Found {
        record,
        success: true,
    }))
}

async fn list_events(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<Listing<Event>>, ApiError> {
    let data = app
        .use_cases
        .lookup
        .events
        .list(auth_token(&headers))
        .await?;
    Ok(Json(Listing {
        data,
        success: true,
    }))
}

async fn get_event(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<Found<Event>>, ApiError> {
    let id: EventId = event_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid event id: {}", event_id)))?;
    let record = app
        .use_cases
        .lookup
        .events
        .get(auth_token(&headers), id)
        .await?;
    Ok(Json(Found {
        record,
        success: true,
    }))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    success: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid auth token".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorBody {
                message,
                success: false,
            }),
        )
            .into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::InvalidCredential => ApiError::Unauthorized,
            LookupError::NotFound(_) => ApiError::NotFound(e.to_string()),
            LookupError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            LookupError::Repo(repo) => ApiError::Internal(repo.to_string()),
        }
    }
}
