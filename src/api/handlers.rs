use actix_web::{web, HttpResponse, Responder};
use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use std::future;

use crate::blockchain::{
    mine_with_progress, Block, LedgerSummary, MiningProgress, SharedLedger, SubmissionResult, Transaction,
};

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub progress: MiningProgress,
}

/// Data structure for the application state
pub type AppData = web::Data<AppState>;

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// Whether the chain is valid
    pub is_valid: bool,
}

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

/// Request for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineRequest {
    /// Account receiving the reward, the bank itself when omitted
    #[serde(default)]
    pub miner: Option<String>,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    pub message: String,
    pub block: Block,
}

/// One row of the balance table
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub account: String,
    pub balance: f64,
}

/// Get the dashboard figures
///
/// Returns the account count, circulating coins, pending count and last block index
#[utoipa::path(
    get,
    path = "/api/v1/summary",
    responses(
        (status = 200, description = "Summary retrieved successfully", body = LedgerSummary)
    )
)]
pub async fn get_summary(state: AppData) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.summary())
}

/// Get the full blockchain
///
/// Returns every sealed block and the validity status of the chain
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Blockchain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(state: AppData) -> impl Responder {
    let (chain, is_valid) = state
        .ledger
        .read(|ledger| (ledger.chain().to_vec(), ledger.is_valid()));

    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain,
        is_valid,
    })
}

/// Check if the blockchain is valid
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Blockchain validation status", body = bool)
    )
)]
pub async fn validate_chain(state: AppData) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.is_valid())
}

/// Get all pending transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(state: AppData) -> impl Responder {
    HttpResponse::Ok().json(state.ledger.pending_transactions())
}

/// Submit a transfer
///
/// Admitted transfers update balances immediately and wait in the pending pool
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted", body = SubmissionResult),
        (status = 400, description = "Transaction rejected", body = SubmissionResult)
    )
)]
pub async fn new_transaction(state: AppData, request: web::Json<TransactionRequest>) -> impl Responder {
    let sender = request.sender.trim();
    let receiver = request.receiver.trim();

    let result = state.ledger.submit_transaction(sender, receiver, request.amount);

    if result.accepted {
        HttpResponse::Created().json(result)
    } else {
        HttpResponse::BadRequest().json(result)
    }
}

/// Mine a new block
///
/// Plays the mining countdown, then seals every pending transaction
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    request_body(content = MineRequest, description = "Miner name, optional; the body may be omitted"),
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse),
        (status = 500, description = "Mining did not complete")
    )
)]
pub async fn mine_block(state: AppData, request: Option<web::Json<MineRequest>>) -> impl Responder {
    let requested = request.and_then(|body| body.into_inner().miner);

    let miner = match requested.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => state.ledger.read(|ledger| ledger.config().privileged_account.clone()),
    };

    // A dropped request drops this future before the block is sealed
    let outcome = mine_with_progress(
        &state.ledger,
        &miner,
        &state.progress,
        |percent| debug!("Mining block by {}... {}%", miner, percent),
        future::pending(),
    )
    .await;

    match outcome {
        Ok(mined) => HttpResponse::Ok().json(MineResponse {
            message: mined.message,
            block: mined.block,
        }),
        Err(err) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to mine block: {}", err)
        })),
    }
}

/// Get all accounts
///
/// Returns the balance table in the order accounts were first seen
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = Vec<AccountResponse>)
    )
)]
pub async fn get_all_accounts(state: AppData) -> impl Responder {
    let accounts: Vec<AccountResponse> = state
        .ledger
        .balances()
        .into_iter()
        .map(|(id, balance)| AccountResponse {
            account: id.0,
            balance,
        })
        .collect();

    HttpResponse::Ok().json(accounts)
}

/// Get one account balance
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account}",
    params(
        ("account" = String, Path, description = "Account name")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = AccountResponse),
        (status = 404, description = "Unknown account")
    )
)]
pub async fn get_account_balance(state: AppData, account: web::Path<String>) -> impl Responder {
    let account = account.into_inner();

    match state.ledger.balance(&account) {
        Some(balance) => HttpResponse::Ok().json(AccountResponse { account, balance }),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Account not found: {}", account)
        })),
    }
}
