use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde_json::{json, Value};

use crate::routes::app_state::AppState;

/// Validates the shared access password and marks the session
/// authenticated. An absent or mismatched password is rejected without
/// touching the model or the retriever.
pub async fn authenticate(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    let session_id = if let Ok(Some(id)) = session.get::<String>("session_id") {
        id
    } else {
        req_body["session_id"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    };

    if data.session_manager.get(&session_id).is_none() {
        return HttpResponse::InternalServerError()
            .json(json!({"error": "Session not initialized"}));
    }

    if !data.config.requires_auth() {
        return HttpResponse::Ok().json(json!({"authenticated": true}));
    }

    let password = req_body["password"].as_str().unwrap_or_default();
    if !password.is_empty() && password == data.config.access_password {
        data.session_manager.set_authenticated(&session_id);
        info!("Session {} authenticated", session_id);
        HttpResponse::Ok().json(json!({"authenticated": true}))
    } else {
        warn!("Failed authentication attempt for session {}", session_id);
        HttpResponse::Unauthorized()
            .json(json!({"error": "Incorrect password. Please try again."}))
    }
}
