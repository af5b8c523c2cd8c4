//! # REST Handlers
//!
//! One generic handler per operation, instantiated for each record kind.
//!
//! Handlers only translate: they slice listings, shape responses and map
//! store errors. Identity, uniqueness and merge rules live in the store.
//! Malformed paths, query strings and bodies are turned into `ApiError`s by
//! the [`extract`](super::extract) wrappers before a handler runs.

use super::auth::CurrentUser;
use super::dto::{HealthResponse, Pagination, Resource, WelcomeResponse};
use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::config::Settings;
use crate::infrastructure::persistence::{RecordStore, Repository};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Record store.
    pub store: Arc<dyn RecordStore>,
    /// Loaded settings.
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.settings.app.name),
        version: state.settings.app.version.clone(),
        docs: "/docs".to_string(),
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// `GET /{collection}?skip=&limit=`
///
/// # Errors
///
/// Returns `ApiError::Internal` if the store cannot be read.
pub async fn list<R>(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(page): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<R::Response>>>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    let records = Repository::<R>::list_all(state.store.as_ref()).await?;
    Ok(Json(
        page.apply(records).into_iter().map(R::into_wire).collect(),
    ))
}

/// `GET /{collection}/{key}`
///
/// # Errors
///
/// Returns `ApiError::NotFound` if no record has the key.
pub async fn get<R>(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(key): ApiPath<R::Key>,
) -> ApiResult<Json<R::Response>>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    Repository::<R>::get(state.store.as_ref(), &key)
        .await?
        .map(|record| Json(record.into_wire()))
        .ok_or(ApiError::NotFound(R::KIND.label()))
}

/// `POST /{collection}`
///
/// # Errors
///
/// Returns `ApiError::Duplicate` if the business key is taken.
pub async fn create<R>(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(draft): ApiJson<R::Draft>,
) -> ApiResult<(StatusCode, Json<R::Response>)>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    let record = Repository::<R>::create(state.store.as_ref(), draft).await?;
    info!(kind = %R::KIND, key = %record.key(), id = record.id(), "created");
    Ok((StatusCode::CREATED, Json(record.into_wire())))
}

/// `PUT /{collection}/{key}`
///
/// # Errors
///
/// Returns `ApiError::NotFound` if no record has the key.
pub async fn update<R>(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(key): ApiPath<R::Key>,
    ApiJson(patch): ApiJson<R::Patch>,
) -> ApiResult<Json<R::Response>>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    let record = Repository::<R>::update(state.store.as_ref(), &key, patch).await?;
    info!(kind = %R::KIND, key = %key, "updated");
    Ok(Json(record.into_wire()))
}

/// `DELETE /{collection}/{key}`
///
/// # Errors
///
/// Returns `ApiError::NotFound` if no record has the key.
pub async fn delete<R>(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(key): ApiPath<R::Key>,
) -> ApiResult<StatusCode>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    if Repository::<R>::delete(state.store.as_ref(), &key).await? {
        info!(kind = %R::KIND, key = %key, "deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(R::KIND.label()))
    }
}
