use actix_files::Files;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};

use MarkazChatAgent::config::{self, AppConfig};
use MarkazChatAgent::models::report_index::ReportIndex;
use MarkazChatAgent::routes::app_state::AppState;
use MarkazChatAgent::routes::{auth_routes, chat_routes, session_routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    config::init_logging();

    let app_config = match AppConfig::from_env() {
        Ok(app_config) => app_config,
        Err(e) => {
            error!("Configuration error: {}", e);
            error!("Set the variables in your deployment environment and restart.");
            std::process::exit(1);
        }
    };

    let index = match ReportIndex::load(&app_config.db_path) {
        Ok(index) => index,
        Err(e) => {
            error!("Failed to load report index: {}", e);
            std::process::exit(1);
        }
    };
    if index.is_empty() {
        warn!(
            "Report index at {} contains no passages; answers will not be grounded in the report",
            app_config.db_path
        );
    } else {
        info!(
            "Loaded {} report passages from {}",
            index.len(),
            app_config.db_path
        );
    }
    if app_config.requires_auth() && app_config.access_password == config::DEFAULT_ACCESS_PASSWORD {
        warn!("ACCESS_PASSWORD is not set; falling back to the built-in default");
    }

    let port = app_config.port;
    let state = match AppState::new(app_config, index) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to build the model client: {}", e);
            std::process::exit(1);
        }
    };

    let secret_key = Key::generate();
    info!("Starting server on http://0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::new(state.clone()))
            .configure(session_routes::init_routes)
            .configure(auth_routes::init_routes)
            .configure(chat_routes::init_routes)
            // Serve the chat page and assets from "./static".
            .service(Files::new("/", "./static").index_file("index.html"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
