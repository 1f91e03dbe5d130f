//! Request handlers
//!
//! Every store access does blocking file IO under the global lock, so handlers
//! hand the work to tokio's blocking pool through [`run_blocking`].

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::core::DEFAULT_TRANSACTION_LIMIT;
use crate::types::{PresenceEntry, Transaction, Wallet};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

async fn run_blocking<R, F>(f: F) -> ApiResult<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(MessageResponse {
            success: true,
            message: message.into(),
        })
    }
}

// ============================================================================
// Wallet Handlers
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub success: bool,
    pub wallet: Wallet,
}

/// GET /api/wallet/:user_id
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<WalletResponse>> {
    let wallet = run_blocking(move || state.ledger.get_wallet(&user_id)).await??;
    Ok(Json(WalletResponse {
        success: true,
        wallet,
    }))
}

/// Body of deposit and withdraw requests
///
/// Both fields are optional so that a missing value is reported as a ledger
/// validation error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl AmountRequest {
    fn into_parts(self) -> (String, Decimal) {
        (
            self.user_id.unwrap_or_default(),
            self.amount.unwrap_or(Decimal::ZERO),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub message: String,
    pub transaction: Transaction,
}

/// POST /api/wallet/deposit
pub async fn deposit(
    State(state): State<AppState>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    let Json(request) = body?;
    let (user_id, amount) = request.into_parts();
    let transaction = run_blocking(move || state.ledger.deposit(&user_id, amount)).await??;
    Ok(Json(TransactionResponse {
        success: true,
        message: format!("Deposit succeeded ¥{:.2}", transaction.amount),
        transaction,
    }))
}

/// POST /api/wallet/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    let Json(request) = body?;
    let (user_id, amount) = request.into_parts();
    let transaction = run_blocking(move || state.ledger.withdraw(&user_id, amount)).await??;
    Ok(Json(TransactionResponse {
        success: true,
        message: format!("Withdrawal succeeded ¥{:.2}", transaction.amount),
        transaction,
    }))
}

/// Query of the transaction listing
///
/// `limit` is kept as text so that a value that is not a count falls back to
/// the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<String>,
}

impl TransactionsQuery {
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse().ok())
            .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
    pub count: usize,
}

/// GET /api/wallet/transactions/:user_id?limit=N
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Option<Query<TransactionsQuery>>,
) -> ApiResult<Json<TransactionsResponse>> {
    let limit = query.map(|Query(query)| query).unwrap_or_default().limit();
    let transactions =
        run_blocking(move || state.ledger.list_transactions(&user_id, limit)).await?;
    Ok(Json(TransactionsResponse {
        success: true,
        count: transactions.len(),
        transactions,
    }))
}

// ============================================================================
// Presence Handlers
// ============================================================================

/// GET /api/user-presence
pub async fn get_presence(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, PresenceEntry>>> {
    let snapshot = run_blocking(move || state.presence.snapshot()).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub online: bool,
}

/// POST /api/user-presence
pub async fn update_presence(
    State(state): State<AppState>,
    body: Result<Json<PresenceRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = body?;
    run_blocking(move || {
        state
            .presence
            .record_activity(&request.username, request.online, Utc::now())
    })
    .await??;
    Ok(MessageResponse::ok("Presence updated"))
}

// ============================================================================
// Admin Session Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub username: String,
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub message: String,
    pub admin: AdminInfo,
    pub expires_at: DateTime<Utc>,
}

fn require_token(request: TokenRequest, status: StatusCode) -> ApiResult<String> {
    request
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::new(status, "A session token is required"))
}

/// POST /api/admin/validate
pub async fn validate_session(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<ValidateResponse>> {
    let Json(request) = body?;
    let token = require_token(request, StatusCode::UNAUTHORIZED)?;
    let session = run_blocking(move || state.sessions.validate(&token, Utc::now()))
        .await?
        .map_err(ApiError::unauthorized)?;

    Ok(Json(ValidateResponse {
        success: true,
        message: "Session is valid".to_string(),
        admin: AdminInfo {
            username: session.username,
            role: "admin",
        },
        expires_at: session.expires_at,
    }))
}

/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = body?;
    let token = require_token(request, StatusCode::BAD_REQUEST)?;
    run_blocking(move || state.sessions.logout(&token)).await??;
    Ok(MessageResponse::ok("Admin logged out"))
}

/// GET /health
pub async fn health() -> Json<MessageResponse> {
    MessageResponse::ok("ok")
}
