//! # Routes
//!
//! Router assembly and middleware.

use super::dto::Resource;
use super::handlers::{self, AppState};
use crate::domain::entities::{Allocation, Broker, Deal, Portfolio};
use crate::infrastructure::persistence::{RecordStore, Repository};
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Builds the CRUD routes for one record kind, mounted at `/{collection}`.
fn collection_routes<R>() -> Router<AppState>
where
    R: Resource,
    dyn RecordStore: Repository<R>,
{
    let base = format!("/{}", R::KIND.collection());
    let item = format!("{base}/{{key}}");
    let collection = get(handlers::list::<R>).post(handlers::create::<R>);

    Router::new()
        .route(&base, collection.clone())
        .route(&format!("{base}/"), collection)
        .route(
            &item,
            get(handlers::get::<R>)
                .put(handlers::update::<R>)
                .delete(handlers::delete::<R>),
        )
}

/// Builds the CORS layer from the configured origins.
///
/// Methods and headers mirror the preflight request, since wildcards cannot
/// be combined with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates the application router.
///
/// Collection routes are nested under `app.api_prefix`; `/` and `/health`
/// stay at the root.
pub fn create_router(state: AppState) -> Router {
    let prefix = state.settings.app.api_prefix.clone();
    let origins = state.settings.cors.allowed_origins_list();

    let api = Router::new()
        .merge(collection_routes::<Deal>())
        .merge(collection_routes::<Broker>())
        .merge(collection_routes::<Portfolio>())
        .merge(collection_routes::<Allocation>());

    let api = if prefix == "/" {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&origins))
        .with_state(state)
}
