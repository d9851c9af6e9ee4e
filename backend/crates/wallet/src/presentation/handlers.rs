//! HTTP Handlers

use std::sync::Arc;

use account::CurrentUser;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::WithdrawalId;
use notification::NotificationSink;

use crate::application::config::WalletConfig;
use crate::application::topup::{
    HandleNotificationUseCase, InitiateTopUpUseCase, PollTopUpUseCase, TopUpQueryUseCase,
};
use crate::application::withdrawal::{
    RequestWithdrawalUseCase, ReviewWithdrawalsUseCase, WithdrawalHistoryUseCase,
};
use crate::domain::gateway::PaymentGateway;
use crate::domain::repository::{TopUpRepository, WithdrawalRepository};
use crate::domain::withdrawal::WithdrawalStatus;
use crate::error::WalletResult;
use crate::presentation::dto::{
    InitiateTopUpRequest, InitiateTopUpResponse, ReconcileResponse, TopUpResponse, WebhookAck,
    WebhookPayload, WithdrawalBody, WithdrawalListQuery, WithdrawalResponse,
};

/// Everything the wallet handlers need from storage
pub trait WalletStore: TopUpRepository + WithdrawalRepository + Clone + Send + Sync + 'static {}

impl<T> WalletStore for T where T: TopUpRepository + WithdrawalRepository + Clone + Send + Sync + 'static {}

/// Shared state for wallet handlers
pub struct WalletAppState<R, G, N>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub gateway: Arc<G>,
    pub sink: Arc<N>,
    pub config: Arc<WalletConfig>,
}

impl<R, G, N> Clone for WalletAppState<R, G, N>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            gateway: self.gateway.clone(),
            sink: self.sink.clone(),
            config: self.config.clone(),
        }
    }
}

/// POST /api/topup
pub async fn initiate_topup<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<InitiateTopUpRequest>,
) -> WalletResult<Json<InitiateTopUpResponse>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = InitiateTopUpUseCase::new(
        state.repo.clone(),
        state.gateway.clone(),
        state.config.clone(),
    );
    let initiated = use_case.execute(user.id, req.amount).await?;
    Ok(Json(initiated.into()))
}

/// POST /api/topup/notification
pub async fn payment_notification<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Json(payload): Json<WebhookPayload>,
) -> WalletResult<Json<WebhookAck>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case =
        HandleNotificationUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    use_case.execute(payload.into()).await?;
    Ok(Json(WebhookAck { status: "ok" }))
}

/// POST /api/topup/{order_id}/confirm
pub async fn confirm_topup<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> WalletResult<Json<ReconcileResponse>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case =
        PollTopUpUseCase::new(state.repo.clone(), state.gateway.clone(), state.sink.clone());
    let reconciled = use_case.execute(user.id, &order_id).await?;
    Ok(Json(reconciled.into()))
}

/// GET /api/topup/history
pub async fn topup_history<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
) -> WalletResult<Json<Vec<TopUpResponse>>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = TopUpQueryUseCase::new(state.repo.clone(), state.config.clone());
    let history = use_case.history(user.id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// GET /api/topup/{order_id}
pub async fn topup_status<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<String>,
) -> WalletResult<Json<TopUpResponse>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = TopUpQueryUseCase::new(state.repo.clone(), state.config.clone());
    let transaction = use_case.status(user.id, &order_id).await?;
    Ok(Json(transaction.into()))
}

/// POST /api/withdrawals
pub async fn request_withdrawal<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<WithdrawalBody>,
) -> WalletResult<(StatusCode, Json<WithdrawalResponse>)>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = RequestWithdrawalUseCase::new(state.repo.clone(), state.config.clone());
    let request = use_case.execute(user.id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// GET /api/withdrawals
pub async fn withdrawal_history<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Extension(user): Extension<CurrentUser>,
) -> WalletResult<Json<Vec<WithdrawalResponse>>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case = WithdrawalHistoryUseCase::new(state.repo.clone(), state.config.clone());
    let history = use_case.execute(user.id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/withdrawals
pub async fn list_withdrawals<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Query(query): Query<WithdrawalListQuery>,
) -> WalletResult<Json<Vec<WithdrawalResponse>>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<WithdrawalStatus>())
        .transpose()?;

    let use_case =
        ReviewWithdrawalsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let requests = use_case.list(status).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/withdrawals/{withdrawal_id}/approve
pub async fn approve_withdrawal<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Path(withdrawal_id): Path<WithdrawalId>,
) -> WalletResult<Json<WithdrawalResponse>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case =
        ReviewWithdrawalsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let request = use_case.approve(withdrawal_id).await?;
    Ok(Json(request.into()))
}

/// POST /api/admin/withdrawals/{withdrawal_id}/reject
pub async fn reject_withdrawal<R, G, N>(
    State(state): State<WalletAppState<R, G, N>>,
    Path(withdrawal_id): Path<WithdrawalId>,
) -> WalletResult<Json<WithdrawalResponse>>
where
    R: WalletStore,
    G: PaymentGateway + Send + Sync + 'static,
    N: NotificationSink + Send + Sync + 'static,
{
    let use_case =
        ReviewWithdrawalsUseCase::new(state.repo.clone(), state.sink.clone(), state.config.clone());
    let request = use_case.reject(withdrawal_id).await?;
    Ok(Json(request.into()))
}
