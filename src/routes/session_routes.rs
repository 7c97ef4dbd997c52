use actix_session::Session;
use actix_web::{get, post, web, Responder};
use serde_json::Value;

use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(init_session);
    cfg.service(clear_history);
}

#[get("/init_session")]
async fn init_session(data: web::Data<AppState>, session: Session) -> impl Responder {
    crate::handlers::session_handler::initialize_session(data, session).await
}

#[post("/clear_history")]
async fn clear_history(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::session_handler::clear_session_history(data, session, req_body).await
}
