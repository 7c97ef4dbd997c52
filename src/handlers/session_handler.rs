use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info};
use serde_json::json;

use crate::routes::app_state::AppState;

pub async fn initialize_session(data: web::Data<AppState>, session: Session) -> HttpResponse {
    // Reuse the session from the cookie when it still exists server-side.
    if let Ok(Some(existing)) = session.get::<String>("session_id") {
        if data.session_manager.get(&existing).is_some() {
            return HttpResponse::Ok().json(json!({
                "initialized": true,
                "session_id": existing,
                "passages": data.index.len(),
            }));
        }
    }

    // Outside production the access gate is off, so sessions start
    // authenticated.
    let authenticated = !data.config.requires_auth();
    let session_id = data.session_manager.create(authenticated);

    if let Err(e) = session.insert("session_id", session_id.clone()) {
        error!("Failed to insert session_id into cookie: {:?}", e);
    } else {
        info!("Stored session_id {} in cookie", session_id);
    }
    info!("Initialized user session: {}", session_id);

    HttpResponse::Ok().json(json!({
        "initialized": true,
        "session_id": session_id,
        "passages": data.index.len(),
    }))
}

pub async fn clear_session_history(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let session_id = if let Ok(Some(id)) = session.get::<String>("session_id") {
        id
    } else {
        req_body["session_id"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    };

    if data.session_manager.clear_history(&session_id) {
        info!("Cleared chat history for session {}", session_id);
        HttpResponse::Ok().json(json!({"cleared": true}))
    } else {
        error!("Session \"{}\" not found", session_id);
        HttpResponse::InternalServerError().json(json!({"error": "Session not initialized"}))
    }
}
