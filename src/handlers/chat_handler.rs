use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde_json::Value;

use crate::routes::app_state::AppState;
use crate::services::chat_service;

pub async fn handle_chat_request(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> HttpResponse {
    // Retrieve session_id from cookie (or fallback)
    let session_id = if let Ok(Some(id)) = session.get::<String>("session_id") {
        id
    } else {
        warn!("No valid session_id found in cookie; falling back to request body");
        req_body["session_id"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    };

    let mut user_session = match data.session_manager.get(&session_id) {
        Some(user_session) => user_session,
        None => {
            error!("Session \"{}\" not found", session_id);
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Session not initialized"}));
        }
    };

    // The access gate runs before any retrieval or model call.
    if data.config.requires_auth() && !user_session.authenticated {
        warn!("Rejected unauthenticated chat request for session {}", session_id);
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({"error": "Access password required"}));
    }

    let user_input = req_body["message"].as_str().unwrap_or_default().to_string();
    if user_input.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({"error": "Message must not be empty"}));
    }
    info!("Processing message for session {}", session_id);

    let reply = chat_service::process_chat(
        &user_input,
        &mut user_session,
        &data.index,
        data.client.as_ref(),
        data.client.as_ref(),
    )
    .await;

    // Persist the updated history after processing.
    data.session_manager.insert(session_id, user_session);
    HttpResponse::Ok().json(reply)
}
