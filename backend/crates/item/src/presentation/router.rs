//! Item Routers
//!
//! Split by access level so the binary can layer `require_user` and
//! `require_admin` only where needed. `item_public_router` and
//! `item_router` share paths and are meant to be merged.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use notification::{NotificationSink, PgNotificationRepository};
use std::sync::Arc;

use crate::application::config::ItemConfig;
use crate::infra::postgres::PgItemRepository;
use crate::presentation::handlers::{self, ItemAppState, ItemStore};

/// Anonymous read routes under `/api/items`
pub fn item_public_router(repo: PgItemRepository, sink: PgNotificationRepository, config: Arc<ItemConfig>) -> Router {
    item_public_router_generic(repo, sink, config)
}

/// Signed-in routes under `/api/items` (expects `require_user`)
pub fn item_router(repo: PgItemRepository, sink: PgNotificationRepository, config: Arc<ItemConfig>) -> Router {
    item_router_generic(repo, sink, config)
}

/// Moderation routes under `/api/admin` (expects `require_user` and `require_admin`)
pub fn item_admin_router(repo: PgItemRepository, sink: PgNotificationRepository, config: Arc<ItemConfig>) -> Router {
    item_admin_router_generic(repo, sink, config)
}

fn state<R, N>(repo: R, sink: N, config: Arc<ItemConfig>) -> ItemAppState<R, N>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    ItemAppState {
        repo: Arc::new(repo),
        sink: Arc::new(sink),
        config,
    }
}

pub fn item_public_router_generic<R, N>(repo: R, sink: N, config: Arc<ItemConfig>) -> Router
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::browse::<R, N>))
        .route("/highlights", get(handlers::highlights::<R, N>))
        .route("/categories", get(handlers::list_categories::<R, N>))
        .route("/categories/{category_id}", get(handlers::category::<R, N>))
        .route(
            "/categories/{category_id}/highlights",
            get(handlers::category_highlights::<R, N>),
        )
        .route("/subcategories/{subcategory_id}", get(handlers::subcategory::<R, N>))
        .route("/{item_id}", get(handlers::detail::<R, N>))
        .route("/{item_id}/comments", get(handlers::list_comments::<R, N>))
        .with_state(state(repo, sink, config))
}

pub fn item_router_generic<R, N>(repo: R, sink: N, config: Arc<ItemConfig>) -> Router
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(handlers::create::<R, N>))
        .route(
            "/{item_id}",
            patch(handlers::edit::<R, N>).delete(handlers::delete::<R, N>),
        )
        .route("/{item_id}/claim", post(handlers::claim::<R, N>))
        .route("/{item_id}/claims", get(handlers::list_claims::<R, N>))
        .route("/{item_id}/select-finder", post(handlers::select_finder::<R, N>))
        .route("/{item_id}/confirm", post(handlers::confirm::<R, N>))
        .route("/{item_id}/highlight", post(handlers::highlight::<R, N>))
        .route("/{item_id}/comments", post(handlers::post_comment::<R, N>))
        .route("/{item_id}/reports", post(handlers::report::<R, N>))
        .with_state(state(repo, sink, config))
}

pub fn item_admin_router_generic<R, N>(repo: R, sink: N, config: Arc<ItemConfig>) -> Router
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/reports", get(handlers::list_reports::<R, N>))
        .route("/reports/{report_id}/resolve", post(handlers::resolve_report::<R, N>))
        .route("/reports/{report_id}/warn", post(handlers::warn_owner::<R, N>))
        .route("/items/{item_id}", delete(handlers::admin_delete::<R, N>))
        .with_state(state(repo, sink, config))
}
