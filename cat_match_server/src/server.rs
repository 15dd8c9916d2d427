use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use cat_match_engine::{
    events::{EventHandlers, EventProducers},
    CatApi,
    MatchFlowApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    notifier::notification_hooks,
    routes::{
        health,
        ApproveMatchRoute,
        CreateMatchRoute,
        DeleteCatRoute,
        MyCatsRoute,
        MyMatchesRoute,
        RegisterCatRoute,
        RejectMatchRoute,
        UpdateCatRoute,
        WithdrawMatchRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    } else {
        info!("🚀️ CMS_RUN_MIGRATIONS is off. Assuming the database schema is up to date.");
    }
    let handlers = EventHandlers::new(config.event_buffer_size, notification_hooks(config.notify_webhook_url.clone()));
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let match_api = MatchFlowApi::new(db.clone(), producers.clone()).with_store_timeout(config.store_timeout);
        let cat_api = CatApi::new(db.clone()).with_store_timeout(config.store_timeout);
        let token_issuer = TokenIssuer::new(&config.auth);
        let api_scope = web::scope("/api")
            .service(CreateMatchRoute::<SqliteDatabase>::new())
            .service(MyMatchesRoute::<SqliteDatabase>::new())
            .service(ApproveMatchRoute::<SqliteDatabase>::new())
            .service(RejectMatchRoute::<SqliteDatabase>::new())
            .service(WithdrawMatchRoute::<SqliteDatabase>::new())
            .service(MyCatsRoute::<SqliteDatabase>::new())
            .service(RegisterCatRoute::<SqliteDatabase>::new())
            .service(UpdateCatRoute::<SqliteDatabase>::new())
            .service(DeleteCatRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cms::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(web::Data::new(match_api))
            .app_data(web::Data::new(cat_api))
            .app_data(web::Data::new(token_issuer))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed bodies get the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into())
}
