//! # REST Layer
//!
//! [`router`] exposes a shared [`PracticeApi`] over HTTP. Every collection gets
//! the same five CRUD routes; patients and physicians also get `/search`.
//!
//! Repository calls take a lock and may write files, so handlers run them on
//! the blocking pool. Errors are rendered as an [`ErrorBody`] with a status
//! derived from the error's [`ErrorKind`].

use crate::api::PracticeApi;
use crate::commands::appointments::AppointmentFilter;
use crate::commands::notes::NoteFilter;
use crate::commands::Draft;
use crate::error::{ErrorBody, ErrorKind, PracticeError, Result};
use crate::model::{
    Appointment, AppointmentDraft, Entity, Id, MedicalNote, NoteDraft, Patient, PatientDraft,
    Physician, PhysicianDraft, Searchable,
};
use crate::store::table::Tabled;
use crate::store::StorageBackend;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

type Shared<S> = Arc<PracticeApi<S>>;

pub fn router<S: StorageBackend + 'static>(api: Shared<S>) -> Router {
    Router::new()
        .route(
            "/patients",
            get(list::<Patient, S>).post(create::<PatientDraft, S>),
        )
        .route("/patients/search", get(search::<Patient, S>))
        .route(
            "/patients/:id",
            get(get_one::<Patient, S>)
                .put(update::<PatientDraft, S>)
                .delete(delete::<Patient, S>),
        )
        .route(
            "/physicians",
            get(list::<Physician, S>).post(create::<PhysicianDraft, S>),
        )
        .route("/physicians/search", get(search::<Physician, S>))
        .route(
            "/physicians/:id",
            get(get_one::<Physician, S>)
                .put(update::<PhysicianDraft, S>)
                .delete(delete::<Physician, S>),
        )
        .route(
            "/appointments",
            get(list_appointments::<S>).post(create::<AppointmentDraft, S>),
        )
        .route(
            "/appointments/:id",
            get(get_one::<Appointment, S>)
                .put(update::<AppointmentDraft, S>)
                .delete(delete::<Appointment, S>),
        )
        .route(
            "/notes",
            get(list_notes::<S>).post(create::<NoteDraft, S>),
        )
        .route(
            "/notes/:id",
            get(get_one::<MedicalNote, S>)
                .put(update::<NoteDraft, S>)
                .delete(delete::<MedicalNote, S>),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(api)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    debug!(
        %method,
        %uri,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Run a repository call on the blocking pool.
async fn blocking<S, R, F>(api: Shared<S>, call: F) -> Result<R>
where
    S: StorageBackend + 'static,
    R: Send + 'static,
    F: FnOnce(&PracticeApi<S>) -> Result<R> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&api))
        .await
        .map_err(|e| PracticeError::Store(format!("repository task failed: {}", e)))?
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn list<T: Tabled, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
) -> Result<Json<Vec<T>>> {
    blocking(api, |api| api.list::<T>()).await.map(Json)
}

async fn list_appointments<S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<Appointment>>> {
    blocking(api, move |api| api.appointments(filter))
        .await
        .map(Json)
}

async fn list_notes<S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<Vec<MedicalNote>>> {
    blocking(api, move |api| api.notes(filter)).await.map(Json)
}

async fn search<T: Searchable + Tabled, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<T>>> {
    blocking(api, move |api| api.search::<T>(&query.q))
        .await
        .map(Json)
}

async fn get_one<T: Tabled, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Path(id): Path<Id>,
) -> Result<Json<T>> {
    blocking(api, move |api| api.get::<T>(id)).await.map(Json)
}

async fn create<D: Draft, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Json(draft): Json<D>,
) -> Result<Response> {
    let created = blocking(api, move |api| api.create(draft)).await?;
    let location = format!(
        "/{}/{}",
        <D::Entity as Entity>::KIND.collection(),
        created.id()
    );
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

async fn update<D: Draft, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Path(id): Path<Id>,
    Json(draft): Json<D>,
) -> Result<Json<D::Entity>> {
    blocking(api, move |api| api.update(id, draft))
        .await
        .map(Json)
}

async fn delete<T: Tabled, S: StorageBackend + 'static>(
    State(api): State<Shared<S>>,
    Path(id): Path<Id>,
) -> Result<StatusCode> {
    blocking(api, move |api| api.delete::<T>(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::ReferenceNotFound | ErrorKind::OutOfBusinessHours => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::DoubleBooked | ErrorKind::DuplicateLicense => StatusCode::CONFLICT,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PracticeError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self);
        if body.error == ErrorKind::Storage {
            error!(error = %self, "request failed");
        } else {
            debug!(kind = ?body.error, error = %self, "request rejected");
        }
        (status_for(body.error), Json(body)).into_response()
    }
}
