// Routes module - assembles every HTTP endpoint onto one router
// auth: session, admin: back office, bettor-facing handlers live in crate::handlers

pub mod admin;
pub mod auth;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // ===== SESSION =====
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::get_session))
        .route("/theme", put(set_theme))

        // ===== BOARD =====
        .route("/matches", get(get_matches))
        .route("/matches/:id", get(get_match))

        // ===== SLIP & BETTING =====
        .route("/slip", get(get_slip).post(add_to_slip).delete(clear_slip))
        .route("/slip/:id", delete(remove_from_slip))
        .route("/bets", get(get_user_bets).post(place_bet))

        // ===== WALLET =====
        .route("/wallet", get(get_wallet))
        .route("/wallet/withdrawals", post(request_withdrawal))

        // ===== NOTIFICATIONS =====
        .route("/notifications", get(get_notifications))
        .route("/notifications/read-all", post(mark_all_notifications_read))
        .route("/notifications/:id/read", post(mark_notification_read))

        // ===== ADMIN =====
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/balance", post(admin::adjust_balance))
        .route("/admin/users/:id/toggle-status", post(admin::toggle_user_status))
        .route("/admin/transactions", get(admin::list_transactions))
        .route("/admin/transactions/:id/status", post(admin::update_transaction_status))
        .route("/admin/matches/:id", patch(admin::update_match))
        .route("/admin/matches/:id/settle", post(admin::settle_match))
        .route("/admin/matches/:id/simulate", post(admin::simulate_match))
        .route("/admin/matches/:id/refresh-odds", post(admin::refresh_odds))
        .route("/admin/tickets", get(admin::list_tickets))
        .route("/admin/tickets/:id/status", post(admin::update_ticket_status))
        .route("/admin/tickets/:id/assign", post(admin::assign_ticket))
        .route("/admin/tickets/:id/messages", post(admin::add_ticket_message))
        .route("/admin/notifications", post(admin::send_notification))
        .route("/admin/dashboard", get(admin::get_dashboard))
        .route("/admin/analytics", get(admin::get_analytics))

        // ===== ACTIVITY FEED =====
        .route("/activity", get(get_activity))

        // Apply CORS and state
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
