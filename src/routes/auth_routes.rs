use actix_session::Session;
use actix_web::{post, web, Responder};
use serde_json::Value;

use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth);
}

#[post("/auth")]
async fn auth(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<Value>,
) -> impl Responder {
    crate::handlers::auth_handler::authenticate(data, session, req_body).await
}
