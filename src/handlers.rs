// HTTP request handlers for the Pirate Parlays API (bettor-facing side)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::{AppState, SharedState};
use crate::error::StoreError;
use crate::models::*;
use crate::views::{self, MatchQuery, NotificationFilter, TransactionFilter};

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

// ===== ERROR MAPPING =====

pub fn failure(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "success": false, "error": message.into() })))
}

/// Business rejection -> HTTP status with `{success: false, error}`
pub fn reject(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::InvalidCredentials | StoreError::NotAuthenticated => {
            StatusCode::UNAUTHORIZED
        }
        StoreError::MatchNotFound(_)
        | StoreError::MarketNotFound { .. }
        | StoreError::SelectionNotFound { .. }
        | StoreError::SelectionIdNotFound(_)
        | StoreError::UserNotFound(_)
        | StoreError::TransactionNotFound(_)
        | StoreError::NotificationNotFound(_)
        | StoreError::TicketNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    failure(status, err.to_string())
}

pub fn require_admin(app: &AppState) -> Result<(), ApiError> {
    if app.book.is_admin() {
        Ok(())
    } else {
        Err(failure(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

/// User id of the logged-in bettor
fn bettor_id(app: &AppState) -> Result<String, ApiError> {
    match app.book.session() {
        Some(session) if session.role == Role::User => Ok(session.user_id.clone()),
        _ => Err(reject(StoreError::NotAuthenticated)),
    }
}

// ===== REQUEST TYPES =====

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Odds are taken from the board, never from the client
#[derive(Debug, Deserialize)]
pub struct AddSelectionRequest {
    pub match_id: String,
    pub market_type: MarketType,
    pub selection_label: String,
}

#[derive(Debug, Deserialize)]
pub struct SlipQuery {
    pub stake: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub stake: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct WalletQuery {
    #[serde(default)]
    pub filter: TransactionFilter,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    pub amount: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub filter: NotificationFilter,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

// ===== HEALTH =====

pub async fn health_check() -> &'static str {
    "Pirate Parlays Sportsbook - Online ✅"
}

// ===== THEME =====

pub async fn set_theme(
    State(state): State<SharedState>,
    Json(payload): Json<ThemeRequest>,
) -> Json<Value> {
    let mut app = state.lock();
    app.book.set_theme(payload.theme);
    Json(json!({ "success": true, "theme": app.book.theme() }))
}

// ===== MATCH ENDPOINTS =====

pub async fn get_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchQuery>,
) -> Json<Value> {
    let app = state.lock();
    let matches = views::search_matches(&app.book, &query);
    Json(json!({ "matches": matches }))
}

pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let app = state.lock();
    let m = app
        .book
        .find_match(&id)
        .ok_or_else(|| reject(StoreError::MatchNotFound(id.clone())))?;
    Ok(Json(json!(m)))
}

// ===== SLIP ENDPOINTS =====

pub async fn get_slip(
    State(state): State<SharedState>,
    Query(query): Query<SlipQuery>,
) -> ApiResult {
    let app = state.lock();
    let slip = app.book.slip();
    let quote = views::quote(slip, query.stake.unwrap_or(Decimal::ZERO)).map_err(reject)?;
    Ok(Json(json!({ "selections": slip, "quote": quote })))
}

pub async fn add_to_slip(
    State(state): State<SharedState>,
    Json(payload): Json<AddSelectionRequest>,
) -> ApiResult {
    let mut app = state.lock();
    let selection = app
        .book
        .selection_for(&payload.match_id, payload.market_type, &payload.selection_label)
        .map_err(reject)?;
    let added = app.book.add_to_slip(selection).map_err(reject)?;
    Ok(Json(json!({
        "success": true,
        "selection": added,
        "slip_size": app.book.slip().len()
    })))
}

pub async fn remove_from_slip(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    app.book.remove_from_slip(&id).map_err(reject)?;
    Ok(Json(json!({ "success": true, "slip_size": app.book.slip().len() })))
}

pub async fn clear_slip(State(state): State<SharedState>) -> Json<Value> {
    state.lock().book.clear_slip();
    Json(json!({ "success": true }))
}

// ===== BETTING ENDPOINTS =====

pub async fn place_bet(
    State(state): State<SharedState>,
    Json(payload): Json<PlaceBetRequest>,
) -> ApiResult {
    let mut app = state.lock();
    let reference_id = app.book.place_bet(payload.stake).map_err(reject)?;

    let bet = app.book.find_bet(&reference_id).cloned();
    if let Some(bet) = &bet {
        let details = format!(
            "{} {} | stake {} @ {} | {}",
            bet.bet_type, bet.reference_id, bet.stake, bet.total_odds, bet.user_id
        );
        app.log_activity("🎯", "BET_PLACED", &details);
    }
    Ok(Json(json!({ "success": true, "reference_id": reference_id, "bet": bet })))
}

pub async fn get_user_bets(State(state): State<SharedState>) -> ApiResult {
    let app = state.lock();
    let user_id = bettor_id(&app)?;
    let bets = views::user_bets(&app.book, &user_id);
    Ok(Json(json!({ "user_id": user_id, "bets": bets })))
}

// ===== WALLET ENDPOINTS =====

pub async fn get_wallet(
    State(state): State<SharedState>,
    Query(query): Query<WalletQuery>,
) -> ApiResult {
    let app = state.lock();
    let user_id = bettor_id(&app)?;
    let summary = views::wallet_summary(&app.book, &user_id)
        .ok_or_else(|| reject(StoreError::NotAuthenticated))?;
    let transactions = views::user_transactions(&app.book, &user_id, query.filter);
    Ok(Json(json!({ "summary": summary, "transactions": transactions })))
}

pub async fn request_withdrawal(
    State(state): State<SharedState>,
    Json(payload): Json<WithdrawalRequestBody>,
) -> ApiResult {
    let mut app = state.lock();
    let transaction = app.book.create_withdrawal_request(payload.amount).map_err(reject)?;
    app.log_activity(
        "🏦",
        "WITHDRAWAL_REQUESTED",
        &format!("{} | {}", transaction.user_id, payload.amount),
    );
    Ok(Json(json!({ "success": true, "transaction": transaction })))
}

// ===== NOTIFICATION ENDPOINTS =====

pub async fn get_notifications(
    State(state): State<SharedState>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult {
    let app = state.lock();
    let user_id = bettor_id(&app)?;
    let notifications = views::user_notifications(&app.book, &user_id, query.filter);
    let unread = views::unread_count(&app.book, &user_id);
    Ok(Json(json!({ "notifications": notifications, "unread": unread })))
}

pub async fn mark_notification_read(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let mut app = state.lock();
    app.book.mark_as_read(&id).map_err(reject)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn mark_all_notifications_read(State(state): State<SharedState>) -> Json<Value> {
    let marked = state.lock().book.mark_all_as_read();
    Json(json!({ "success": true, "marked": marked }))
}

// ===== ACTIVITY FEED =====

pub async fn get_activity(
    State(state): State<SharedState>,
    Query(query): Query<ActivityQuery>,
) -> Json<Value> {
    let app = state.lock();
    let activity = app.recent_activity(query.limit.unwrap_or(100));
    Json(json!({ "activity": activity }))
}
