// Admin back-office routes
// Every handler checks for an admin session first (403 otherwise)

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::SharedState;
use crate::error::StoreError;
use crate::handlers::{reject, require_admin, ApiResult};
use crate::models::*;
use crate::store::{SettlementReport, WithdrawalDecision};
use crate::views::{self, TicketQuery, TransactionQuery};

// ===== REQUEST TYPES =====

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceAdjustmentRequest {
    /// Signed; negative debits
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionStatusRequest {
    pub status: WithdrawalDecision,
}

#[derive(Debug, Deserialize)]
pub struct TicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub agent: String,
}

#[derive(Debug, Deserialize)]
pub struct TicketMessageRequest {
    pub message: String,
    #[serde(default = "agent")]
    pub sender: MessageSender,
}

fn agent() -> MessageSender {
    MessageSender::Agent
}

fn settlement_details(report: &SettlementReport) -> String {
    format!(
        "{} | {} won, {} lost | paid {}",
        report.match_id,
        report.won.len(),
        report.lost.len(),
        report.paid_out
    )
}

// ===== USERS =====

/// GET /admin/users?search=
pub async fn list_users(
    State(state): State<SharedState>,
    Query(query): Query<UserSearchQuery>,
) -> ApiResult {
    let app = state.lock();
    require_admin(&app)?;
    let users = views::search_users(&app.book, query.search.as_deref());
    Ok(Json(json!({ "users": users })))
}

/// POST /admin/users/:id/balance
pub async fn adjust_balance(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(payload): Json<BalanceAdjustmentRequest>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let transaction = app
        .book
        .update_user_balance(&user_id, payload.amount, &payload.reason)
        .map_err(reject)?;
    let balance = app.book.find_user(&user_id).map(|u| u.balance);

    app.log_activity(
        "💰",
        "BALANCE_ADJUSTED",
        &format!("{} | {} | {}", user_id, payload.amount, payload.reason),
    );
    Ok(Json(json!({ "success": true, "transaction": transaction, "balance": balance })))
}

/// POST /admin/users/:id/toggle-status
pub async fn toggle_user_status(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let status = app.book.toggle_user_status(&user_id).map_err(reject)?;
    app.log_activity("🔁", "USER_STATUS", &format!("{} -> {:?}", user_id, status));
    Ok(Json(json!({ "success": true, "status": status })))
}

// ===== TRANSACTIONS =====

/// GET /admin/transactions?search=&type=&status=
pub async fn list_transactions(
    State(state): State<SharedState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult {
    let app = state.lock();
    require_admin(&app)?;
    let transactions = views::search_transactions(&app.book, &query);
    Ok(Json(json!({ "transactions": transactions })))
}

/// POST /admin/transactions/:id/status
pub async fn update_transaction_status(
    State(state): State<SharedState>,
    Path(tx_id): Path<String>,
    Json(payload): Json<TransactionStatusRequest>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    app.book
        .update_transaction_status(&tx_id, payload.status)
        .map_err(reject)?;
    app.log_activity("✅", "WITHDRAWAL_REVIEWED", &format!("{} -> {:?}", tx_id, payload.status));
    Ok(Json(json!({ "success": true, "status": payload.status })))
}

// ===== MATCHES =====

/// PATCH /admin/matches/:id
/// A transition into Final settles the match's pending bets
pub async fn update_match(
    State(state): State<SharedState>,
    Path(match_id): Path<String>,
    Json(update): Json<MatchUpdate>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let settlement = app.book.update_match(&match_id, update).map_err(reject)?;

    app.log_activity("📝", "MATCH_UPDATED", &match_id);
    if let Some(report) = &settlement {
        app.log_activity("🏁", "MATCH_SETTLED", &settlement_details(report));
    }
    let m = app.book.find_match(&match_id);
    Ok(Json(json!({ "success": true, "match": m, "settlement": settlement })))
}

/// POST /admin/matches/:id/settle
pub async fn settle_match(
    State(state): State<SharedState>,
    Path(match_id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let report = app.book.settle_match_bets(&match_id).map_err(reject)?;
    app.log_activity("🏁", "MATCH_SETTLED", &settlement_details(&report));
    Ok(Json(json!({ "success": true, "settlement": report })))
}

/// POST /admin/matches/:id/simulate
pub async fn simulate_match(
    State(state): State<SharedState>,
    Path(match_id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let (home, away) = app.book.simulate_live_update(&match_id).map_err(reject)?;
    Ok(Json(json!({ "success": true, "home_score": home, "away_score": away })))
}

/// POST /admin/matches/:id/refresh-odds
pub async fn refresh_odds(
    State(state): State<SharedState>,
    Path(match_id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let m = app.book.refresh_odds(&match_id).map_err(reject)?.clone();
    app.log_activity("📈", "ODDS_REFRESHED", &m.label());
    Ok(Json(json!({ "success": true, "match": m })))
}

// ===== SUPPORT =====

/// GET /admin/tickets?search=&status=
pub async fn list_tickets(
    State(state): State<SharedState>,
    Query(query): Query<TicketQuery>,
) -> ApiResult {
    let app = state.lock();
    require_admin(&app)?;
    let tickets = views::search_tickets(&app.book, &query);
    Ok(Json(json!({ "tickets": tickets })))
}

/// POST /admin/tickets/:id/status
pub async fn update_ticket_status(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(payload): Json<TicketStatusRequest>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    app.book
        .update_ticket_status(&ticket_id, payload.status)
        .map_err(reject)?;
    Ok(Json(json!({ "success": true, "ticket": app.book.find_ticket(&ticket_id) })))
}

/// POST /admin/tickets/:id/assign
pub async fn assign_ticket(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(payload): Json<AssignTicketRequest>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    app.book.assign_ticket(&ticket_id, &payload.agent).map_err(reject)?;
    Ok(Json(json!({ "success": true, "ticket": app.book.find_ticket(&ticket_id) })))
}

/// POST /admin/tickets/:id/messages
pub async fn add_ticket_message(
    State(state): State<SharedState>,
    Path(ticket_id): Path<String>,
    Json(payload): Json<TicketMessageRequest>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    let message = app
        .book
        .add_ticket_message(&ticket_id, &payload.message, payload.sender)
        .map_err(reject)?;
    Ok(Json(json!({ "success": true, "message": message })))
}

// ===== NOTIFICATIONS =====

/// POST /admin/notifications
pub async fn send_notification(
    State(state): State<SharedState>,
    Json(payload): Json<NewNotification>,
) -> ApiResult {
    let mut app = state.lock();
    require_admin(&app)?;
    if app.book.find_user(&payload.user_id).is_none() {
        return Err(reject(StoreError::UserNotFound(payload.user_id)));
    }
    let notification = app.book.add_notification(payload);
    let details = format!("{} | {}", notification.user_id, notification.title);
    app.log_activity("📣", "NOTIFICATION_SENT", &details);
    Ok(Json(json!({ "success": true, "notification": notification })))
}

// ===== DASHBOARDS =====

/// GET /admin/dashboard
pub async fn get_dashboard(State(state): State<SharedState>) -> ApiResult {
    let app = state.lock();
    require_admin(&app)?;
    Ok(Json(json!(views::dashboard(&app.book))))
}

/// GET /admin/analytics
pub async fn get_analytics(State(state): State<SharedState>) -> ApiResult {
    let app = state.lock();
    require_admin(&app)?;
    Ok(Json(json!(views::analytics(&app.book))))
}
