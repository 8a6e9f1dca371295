//! Staking handlers: user info, unstake, migration, pool.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    MigrationPreviewResponse, MigrationRequest, MigrationResponse, PoolInfoResponse,
    RewardBreakdownDto, UnstakeRequest, UnstakeResponse, UserInfoResponse,
};
use crate::app_state::AppState;
use crate::domain::token_amount::{AMOUNT_DISPLAY_PLACES, format_raw_amount};
use crate::error::{ErrorResponse, StakingError};

/// `GET /staking/user-info/{wallet}`: Accrual view of one wallet.
///
/// # Errors
///
/// Returns [`StakingError`] on a malformed wallet, an unresolvable pool,
/// arithmetic overflow, or ledger failure.
#[utoipa::path(
    get,
    path = "/api/v1/staking/user-info/{wallet}",
    tag = "Staking",
    summary = "Get user staking info",
    description = "Resolves the live program layout and computes the wallet's deposit, claimable rewards, share, and earning rates at request time. A wallet that never staked gets zero values.",
    params(("wallet" = String, Path, description = "Wallet address, base58")),
    responses(
        (status = 200, description = "User staking info", body = UserInfoResponse),
        (status = 400, description = "Malformed wallet address", body = ErrorResponse),
        (status = 404, description = "Pool not initialized", body = ErrorResponse),
        (status = 409, description = "Pool layout not recognized", body = ErrorResponse),
        (status = 502, description = "Ledger RPC failure", body = ErrorResponse),
    )
)]
pub async fn get_user_info(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<impl IntoResponse, StakingError> {
    let info = state.staking_service.get_user_info(&wallet).await?;
    Ok(Json(UserInfoResponse::from_view(
        &info,
        state.staking_service.token_decimals(),
    )))
}

/// `POST /staking/unstake`: Build an unsigned withdrawal.
///
/// # Errors
///
/// Returns [`StakingError`] on invalid input, an unresolvable pool, or a
/// build failure.
#[utoipa::path(
    post,
    path = "/api/v1/staking/unstake",
    tag = "Staking",
    summary = "Build unstake transaction",
    description = "Builds an unsigned transaction withdrawing `amount` whole tokens against the live program layout. The wallet signs and submits it.",
    request_body = UnstakeRequest,
    responses(
        (status = 200, description = "Unsigned transaction", body = UnstakeResponse),
        (status = 400, description = "Invalid wallet or amount", body = ErrorResponse),
        (status = 404, description = "Pool not initialized", body = ErrorResponse),
        (status = 500, description = "Transaction build failed", body = ErrorResponse),
    )
)]
pub async fn unstake(
    State(state): State<AppState>,
    Json(req): Json<UnstakeRequest>,
) -> Result<impl IntoResponse, StakingError> {
    let built = state
        .staking_service
        .build_unstake_transaction(&req.wallet_address, &req.amount)
        .await?;

    Ok(Json(UnstakeResponse {
        serialized_transaction_base64: built.to_base64()?,
        state: built.state(),
    }))
}

/// `POST /staking/migration/execute`: Build the migration transaction.
///
/// # Errors
///
/// Returns [`StakingError`] on a malformed wallet, an unreadable snapshot,
/// or a build failure.
#[utoipa::path(
    post,
    path = "/api/v1/staking/migration/execute",
    tag = "Migration",
    summary = "Build migration transaction",
    description = "Computes the wallet's one-time migration credit and builds a transaction carrying the custodial signature on the credit transfer. The wallet adds its own signature and submits.",
    request_body = MigrationRequest,
    responses(
        (status = 200, description = "Partially-signed transaction", body = MigrationResponse),
        (status = 400, description = "Malformed wallet address", body = ErrorResponse),
        (status = 503, description = "Migration snapshot unavailable", body = ErrorResponse),
    )
)]
pub async fn execute_migration(
    State(state): State<AppState>,
    Json(req): Json<MigrationRequest>,
) -> Result<impl IntoResponse, StakingError> {
    let outcome = state
        .staking_service
        .build_migration_transaction(&req.wallet_address)
        .await?;
    let decimals = state.staking_service.token_decimals();

    let total = format_raw_amount(
        u128::from(outcome.breakdown.total_claimable),
        decimals,
        AMOUNT_DISPLAY_PLACES,
    );
    Ok(Json(MigrationResponse {
        serialized_transaction_base64: outcome.transaction.to_base64()?,
        state: outcome.transaction.state(),
        message: format!("Sign to migrate your stake and receive {total} tokens"),
        reward_breakdown: RewardBreakdownDto::from_breakdown(&outcome.breakdown, decimals),
    }))
}

/// `GET /staking/migration/{wallet}`: Preview the migration credit.
///
/// # Errors
///
/// Returns [`StakingError`] on a malformed wallet or an unreadable
/// snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/staking/migration/{wallet}",
    tag = "Migration",
    summary = "Preview migration credit",
    description = "Returns the credit the wallet would receive on migration without building a transaction.",
    params(("wallet" = String, Path, description = "Wallet address, base58")),
    responses(
        (status = 200, description = "Credit breakdown", body = MigrationPreviewResponse),
        (status = 400, description = "Malformed wallet address", body = ErrorResponse),
        (status = 503, description = "Migration snapshot unavailable", body = ErrorResponse),
    )
)]
pub async fn preview_migration(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<impl IntoResponse, StakingError> {
    let breakdown = state.staking_service.preview_migration(&wallet).await?;
    Ok(Json(MigrationPreviewResponse {
        wallet_address: wallet,
        reward_breakdown: RewardBreakdownDto::from_breakdown(
            &breakdown,
            state.staking_service.token_decimals(),
        ),
    }))
}

/// `GET /staking/pool`: Live pool layout and totals.
///
/// # Errors
///
/// Returns [`StakingError`] on an unresolvable pool or ledger failure.
#[utoipa::path(
    get,
    path = "/api/v1/staking/pool",
    tag = "Staking",
    summary = "Get pool info",
    description = "Returns the live program layout, pool totals, reward model, and the accumulator at request time.",
    responses(
        (status = 200, description = "Pool info", body = PoolInfoResponse),
        (status = 404, description = "Pool not initialized", body = ErrorResponse),
        (status = 409, description = "Pool layout not recognized", body = ErrorResponse),
    )
)]
pub async fn get_pool(State(state): State<AppState>) -> Result<impl IntoResponse, StakingError> {
    let pool = state.staking_service.pool_info().await?;
    Ok(Json(PoolInfoResponse::from_view(
        &pool,
        state.staking_service.token_decimals(),
    )))
}

/// Staking resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/staking/user-info/{wallet}", get(get_user_info))
        .route("/staking/unstake", post(unstake))
        .route("/staking/migration/execute", post(execute_migration))
        .route("/staking/migration/{wallet}", get(preview_migration))
        .route("/staking/pool", get(get_pool))
}
