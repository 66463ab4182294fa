use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::json;

use super::dates;
use super::repository::{DocumentStore, NotificationChannel};
use super::service::ComplianceSweepService;

/// Router builder exposing the sweep trigger and the standings listing.
pub fn sweep_router<S, N>(service: Arc<ComplianceSweepService<S, N>>) -> Router
where
    S: DocumentStore + 'static,
    N: NotificationChannel + 'static,
{
    Router::new()
        .route("/api/v1/compliance/sweeps", post(sweep_handler::<S, N>))
        .route(
            "/api/v1/compliance/organizations",
            get(organizations_handler::<S, N>),
        )
        .with_state(service)
}

/// Body of `POST /api/v1/compliance/sweeps`. Both fields are optional;
/// an empty object runs a real sweep at the current local time.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub as_of: Option<String>,
}

pub(crate) async fn sweep_handler<S, N>(
    State(service): State<Arc<ComplianceSweepService<S, N>>>,
    axum::Json(request): axum::Json<SweepRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    N: NotificationChannel + 'static,
{
    let now = match sweep_instant(request.as_of.as_deref()) {
        Ok(now) => now,
        Err(raw) => {
            let payload = json!({
                "error": format!("unparseable as_of date '{raw}'"),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let result = if request.dry_run {
        service.preview(now)
    } else {
        service.run(now)
    };

    match result {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn organizations_handler<S, N>(
    State(service): State<Arc<ComplianceSweepService<S, N>>>,
) -> Response
where
    S: DocumentStore + 'static,
    N: NotificationChannel + 'static,
{
    match service.organizations() {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// An explicit `as_of` date runs the sweep as of midnight that day.
fn sweep_instant(as_of: Option<&str>) -> Result<NaiveDateTime, String> {
    match as_of {
        Some(raw) => dates::parse_date(raw)
            .map(|date| date.and_time(NaiveTime::MIN))
            .ok_or_else(|| raw.to_string()),
        None => Ok(Local::now().naive_local()),
    }
}
