// Session routes for Pirate Parlays
// One process-wide session: logging in replaces whoever was logged in before

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::SharedState;
use crate::error::StoreError;
use crate::handlers::{reject, ApiResult};

// ===== REQUEST/RESPONSE TYPES =====

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ===== ROUTE HANDLERS =====

/// POST /auth/login
/// Demo credential table only: user/1234u and admin/1234a
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult {
    let mut app = state.lock();

    match app.book.login(&payload.username, &payload.password) {
        Ok(session) => {
            let details = format!("{} ({:?})", session.username, session.role);
            app.log_activity("🔐", "LOGIN", &details);
            let user = app.book.find_user(&session.user_id).cloned();
            Ok(Json(json!({ "success": true, "session": session, "user": user })))
        }
        Err(e) => {
            app.log_activity("🚫", "LOGIN_FAILED", &payload.username);
            Err(reject(e))
        }
    }
}

/// POST /auth/logout
pub async fn logout(State(state): State<SharedState>) -> Json<Value> {
    let mut app = state.lock();
    let username = app.book.session().map(|s| s.username.clone());
    app.book.logout();
    if let Some(username) = username {
        app.log_activity("👋", "LOGOUT", &username);
    }
    Json(json!({ "success": true }))
}

/// GET /auth/session
/// Current session plus the bettor's user record, if any
pub async fn get_session(State(state): State<SharedState>) -> ApiResult {
    let app = state.lock();
    let session = app
        .book
        .session()
        .ok_or_else(|| reject(StoreError::NotAuthenticated))?;
    let user = app.book.find_user(&session.user_id);

    Ok(Json(json!({
        "success": true,
        "session": session,
        "user": user,
        "theme": app.book.theme(),
    })))
}
