use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use mediahub_data::compiler::CompileMode;
use mediahub_data::conference::{Conference, NewConference, ValidationResult};
use mediahub_data::db::events::Event;
use mediahub_data::db::{conferences, events};
use mediahub_data::schedule::{self, ScheduleEvent};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// --- Conferences ---

/// A conference record plus the derived fields the frontend renders.
#[derive(Debug, Serialize)]
pub struct ConferenceResponse {
    #[serde(flatten)]
    pub conference: Conference,
    pub display_name: String,
    pub logo_url: String,
}

fn to_response(conference: Conference, state: &AppState) -> ConferenceResponse {
    ConferenceResponse {
        display_name: conference.display_name(),
        logo_url: conference.logo_url(state.config()),
        conference,
    }
}

pub async fn list_conferences(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConferenceResponse>>, ApiError> {
    let conn = state.conn().await;
    let list = conferences::list_all(&conn)?;
    Ok(Json(
        list.into_iter().map(|c| to_response(c, &state)).collect(),
    ))
}

#[derive(Deserialize)]
pub struct CreateConference {
    pub acronym: String,
    pub slug: String,
    pub title: Option<String>,
    pub schedule_url: Option<String>,
    pub logo: Option<String>,
    pub images_path: Option<String>,
    pub recordings_path: Option<String>,
    pub aspect_ratio: Option<String>,
}

pub async fn create_conference(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateConference>,
) -> Result<(StatusCode, Json<ConferenceResponse>), ApiError> {
    let new = NewConference {
        images_path: body.images_path.unwrap_or_else(|| body.slug.clone()),
        recordings_path: body.recordings_path.unwrap_or_else(|| body.slug.clone()),
        acronym: body.acronym,
        slug: body.slug,
        title: body.title,
        schedule_url: body.schedule_url,
        logo: body.logo,
        aspect_ratio: body.aspect_ratio,
    };

    let result = new.validate();
    if !result.is_valid() {
        return Err(ApiError::Validation(result));
    }

    let conn = state.conn().await;
    let id = match conferences::insert(&conn, &new) {
        Ok(id) => id,
        Err(e) => {
            if let Some(field) = conferences::unique_violation_field(&e) {
                let mut result = ValidationResult::new();
                result.add_error(field, "has already been taken");
                return Err(ApiError::Validation(result));
            }
            return Err(e.into());
        }
    };

    let conference = conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;
    drop(conn);

    trigger_fast_compile(&state);
    Ok((StatusCode::CREATED, Json(to_response(conference, &state))))
}

pub async fn get_conference(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ConferenceResponse>, ApiError> {
    let conn = state.conn().await;
    let conference = conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(to_response(conference, &state)))
}

pub async fn delete_conference(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let conn = state.conn().await;
    let deleted = conferences::delete(&conn, id)?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    drop(conn);

    trigger_fast_compile(&state);
    Ok(StatusCode::NO_CONTENT)
}

// --- Schedule ---

#[derive(Deserialize)]
pub struct UpdateSchedule {
    pub schedule_url: Option<String>,
}

/// Set the schedule URL and fire `url_changed`. The cascade lands the
/// record in `downloading`; a job is queued only when the URL is
/// non-empty.
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateSchedule>,
) -> Result<Json<ConferenceResponse>, ApiError> {
    let conn = state.conn().await;
    let mut conference = conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;

    conferences::update_schedule_url(&conn, id, body.schedule_url.as_deref())?;
    conference.schedule_url = body.schedule_url;

    schedule::fire(
        &conn,
        &mut conference,
        ScheduleEvent::UrlChanged,
        &state.queue(),
    )?;
    drop(conn);

    trigger_fast_compile(&state);
    Ok(Json(to_response(conference, &state)))
}

/// Completion callback surface for the download worker. Rejected with
/// 409 unless the record is currently `downloading`.
pub async fn finish_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ConferenceResponse>, ApiError> {
    let conn = state.conn().await;
    let mut conference = conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;

    schedule::fire(
        &conn,
        &mut conference,
        ScheduleEvent::FinishDownload,
        &state.queue(),
    )?;

    Ok(Json(to_response(conference, &state)))
}

// --- Events ---

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let conn = state.conn().await;
    conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(events::list_by_conference(&conn, id)?))
}

#[derive(Deserialize)]
pub struct CreateEvent {
    pub guid: String,
    pub title: String,
}

/// Create an event under a conference. The conference's storage
/// directories must be writable before the record is exposed.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<CreateEvent>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let conn = state.conn().await;
    let conference = conferences::find_by_id(&conn, id)?.ok_or(ApiError::NotFound)?;

    let result = conference.validate_for_api(state.config());
    if !result.is_valid() {
        return Err(ApiError::Validation(result));
    }

    let event_id = match events::insert(&conn, id, &body.guid, &body.title) {
        Ok(event_id) => event_id,
        Err(e) => {
            if matches!(
                &e,
                rusqlite::Error::SqliteFailure(inner, _)
                    if inner.code == rusqlite::ErrorCode::ConstraintViolation
            ) {
                let mut result = ValidationResult::new();
                result.add_error("guid", "has already been taken");
                return Err(ApiError::Validation(result));
            }
            return Err(e.into());
        }
    };

    let created = events::list_by_conference(&conn, id)?
        .into_iter()
        .find(|e| e.id == event_id)
        .ok_or(ApiError::NotFound)?;
    drop(conn);

    trigger_fast_compile(&state);
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Tags ---

#[derive(Serialize)]
pub struct TagResponse {
    pub tag: String,
}

/// Minimal show endpoint for a tag page.
pub async fn show_tag(Path(tag): Path<String>) -> Json<TagResponse> {
    Json(TagResponse { tag })
}

/// Run a fast compile off the request path. Failures are logged, never
/// surfaced to the client.
fn trigger_fast_compile(state: &Arc<AppState>) {
    let compiler = state.compiler();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = compiler.run(CompileMode::Fast) {
            error!(error = %e, "fast compile failed");
        }
    });
}
