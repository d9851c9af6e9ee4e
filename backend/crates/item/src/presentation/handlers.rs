//! HTTP Handlers

use std::sync::Arc;

use account::CurrentUser;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::{CategoryId, ItemId, ReportId, SubCategoryId};
use notification::NotificationSink;

use crate::application::browse::BrowseItemsUseCase;
use crate::application::categories::CategoryUseCase;
use crate::application::comments::CommentUseCase;
use crate::application::config::ItemConfig;
use crate::application::manage_item::{
    CreateItemUseCase, DeleteItemUseCase, EditItemUseCase, HighlightItemUseCase,
};
use crate::application::moderation::{ReviewReportsUseCase, SubmitReportUseCase};
use crate::application::return_flow::{
    ClaimItemUseCase, ConfirmReturnUseCase, ListClaimsUseCase, SelectFinderUseCase,
};
use crate::domain::entity::report::ReportStatus;
use crate::domain::repository::{
    CategoryRepository, ItemRepository, MemberDirectory, ReportRepository,
};
use crate::error::ItemResult;
use crate::presentation::dto::{
    BrowseQuery, CategoryResponse, ClaimCreatedResponse, ClaimResponse, CommentRequest,
    CommentResponse, ConfirmResponse, CreateItemRequest, EditItemRequest, HighlightResponse,
    ItemResponse, LimitQuery, ReportCreatedResponse, ReportListQuery, ReportRequest,
    ReportResponse, SelectFinderRequest, SubCategoryResponse,
};

/// Everything the item handlers need from storage
pub trait ItemStore:
    ItemRepository
    + CategoryRepository
    + ReportRepository
    + MemberDirectory
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> ItemStore for T where
    T: ItemRepository
        + CategoryRepository
        + ReportRepository
        + MemberDirectory
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Shared state for item handlers
pub struct ItemAppState<R, N>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub sink: Arc<N>,
    pub config: Arc<ItemConfig>,
}

// Manual impl: the sink itself does not need to be `Clone`.
impl<R, N> Clone for ItemAppState<R, N>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            sink: self.sink.clone(),
            config: self.config.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/items
pub async fn browse<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Query(query): Query<BrowseQuery>,
) -> ItemResult<Json<Vec<ItemResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = BrowseItemsUseCase::new(state.repo.clone(), state.config.clone());
    let items = use_case.browse(query.into_search()?).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /api/items/highlights
pub async fn highlights<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Query(query): Query<BrowseQuery>,
) -> ItemResult<Json<Vec<ItemResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = BrowseItemsUseCase::new(state.repo.clone(), state.config.clone());
    let items = use_case.highlights(query.category, query.limit).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /api/items/categories
pub async fn list_categories<R, N>(
    State(state): State<ItemAppState<R, N>>,
) -> ItemResult<Json<Vec<CategoryResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CategoryUseCase::new(state.repo.clone());
    let categories = use_case.list().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// GET /api/items/categories/{category_id}
pub async fn category<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(category_id): Path<CategoryId>,
) -> ItemResult<Json<CategoryResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CategoryUseCase::new(state.repo.clone());
    let category = use_case.category(category_id).await?;
    Ok(Json(category.into()))
}

/// GET /api/items/categories/{category_id}/highlights
pub async fn category_highlights<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<LimitQuery>,
) -> ItemResult<Json<Vec<ItemResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = BrowseItemsUseCase::new(state.repo.clone(), state.config.clone());
    let items = use_case.highlights(Some(category_id), query.limit).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /api/items/subcategories/{subcategory_id}
pub async fn subcategory<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(subcategory_id): Path<SubCategoryId>,
) -> ItemResult<Json<SubCategoryResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CategoryUseCase::new(state.repo.clone());
    let subcategory = use_case.subcategory(subcategory_id).await?;
    Ok(Json(subcategory.into()))
}

/// GET /api/items/{item_id}
pub async fn detail<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<ItemResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = BrowseItemsUseCase::new(state.repo.clone(), state.config.clone());
    let item = use_case.detail(item_id).await?;
    Ok(Json(item.into()))
}

/// GET /api/items/{item_id}/comments
pub async fn list_comments<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<Vec<CommentResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CommentUseCase::new(state.repo.clone());
    let comments = use_case.list(item_id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Signed in
// ---------------------------------------------------------------------------

/// POST /api/items
pub async fn create<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateItemRequest>,
) -> ItemResult<(StatusCode, Json<ItemResponse>)>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CreateItemUseCase::new(state.repo.clone(), state.config.clone());
    let item = use_case.execute(user.id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PATCH /api/items/{item_id}
pub async fn edit<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
    Json(req): Json<EditItemRequest>,
) -> ItemResult<Json<ItemResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = EditItemUseCase::new(state.repo.clone());
    let item = use_case.execute(item_id, user.id, req.into()).await?;
    Ok(Json(item.into()))
}

/// DELETE /api/items/{item_id}
pub async fn delete<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<StatusCode>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = DeleteItemUseCase::new(state.repo.clone(), state.sink.clone());
    use_case.execute(item_id, user.id, false).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items/{item_id}/claim
pub async fn claim<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<ClaimCreatedResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = ClaimItemUseCase::new(state.repo.clone());
    let created = use_case.execute(item_id, user.id).await?;
    Ok(Json(ClaimCreatedResponse { created }))
}

/// GET /api/items/{item_id}/claims
pub async fn list_claims<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<Vec<ClaimResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = ListClaimsUseCase::new(state.repo.clone());
    let claims = use_case.execute(item_id, user.id).await?;
    Ok(Json(claims.into_iter().map(Into::into).collect()))
}

/// POST /api/items/{item_id}/select-finder
pub async fn select_finder<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
    Json(req): Json<SelectFinderRequest>,
) -> ItemResult<StatusCode>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = SelectFinderUseCase::new(state.repo.clone());
    use_case.execute(item_id, user.id, req.finder_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items/{item_id}/confirm
pub async fn confirm<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<ConfirmResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = ConfirmReturnUseCase::new(state.repo.clone(), state.sink.clone());
    let outcome = use_case.execute(item_id, user.id).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/items/{item_id}/highlight
pub async fn highlight<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<Json<HighlightResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = HighlightItemUseCase::new(state.repo.clone(), state.config.clone());
    let highlight_expiry = use_case.execute(item_id, user.id).await?;
    Ok(Json(HighlightResponse { highlight_expiry }))
}

/// POST /api/items/{item_id}/comments
pub async fn post_comment<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
    Json(req): Json<CommentRequest>,
) -> ItemResult<(StatusCode, Json<CommentResponse>)>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = CommentUseCase::new(state.repo.clone());
    let comment = use_case.post(item_id, user.id, &req.content).await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// POST /api/items/{item_id}/reports
pub async fn report<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
    Json(req): Json<ReportRequest>,
) -> ItemResult<(StatusCode, Json<ReportCreatedResponse>)>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = SubmitReportUseCase::new(state.repo.clone(), state.sink.clone());
    let report_id = use_case.execute(item_id, &user, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ReportCreatedResponse { report_id })))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/admin/reports
pub async fn list_reports<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Query(query): Query<ReportListQuery>,
) -> ItemResult<Json<Vec<ReportResponse>>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<ReportStatus>())
        .transpose()?;

    let use_case = ReviewReportsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let reports = use_case.list(status).await?;
    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/reports/{report_id}/resolve
pub async fn resolve_report<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(report_id): Path<ReportId>,
) -> ItemResult<Json<ReportResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = ReviewReportsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let report = use_case.resolve(report_id).await?;
    Ok(Json(report.into()))
}

/// POST /api/admin/reports/{report_id}/warn
pub async fn warn_owner<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Path(report_id): Path<ReportId>,
) -> ItemResult<Json<ReportResponse>>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = ReviewReportsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let report = use_case.warn_owner(report_id).await?;
    Ok(Json(report.into()))
}

/// DELETE /api/admin/items/{item_id}
pub async fn admin_delete<R, N>(
    State(state): State<ItemAppState<R, N>>,
    Extension(admin): Extension<CurrentUser>,
    Path(item_id): Path<ItemId>,
) -> ItemResult<StatusCode>
where
    R: ItemStore,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = DeleteItemUseCase::new(state.repo.clone(), state.sink.clone());
    use_case.execute(item_id, admin.id, admin.is_admin).await?;
    Ok(StatusCode::NO_CONTENT)
}
