use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use balls_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::StorageService,
    handlers,
    middlewares::{create_cors, AuthMiddleware},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(config.jwt.secret.clone());
    let storage_service = StorageService::new(config.storage.clone());

    let audit_service = AuditService::new(pool.clone());
    let ledger_service = LedgerService::new(pool.clone());
    let settings_service = SettingsService::new(pool.clone(), audit_service.clone());
    let program_service = ProgramService::new(
        pool.clone(),
        audit_service.clone(),
        ledger_service.clone(),
    );
    let upload_service = UploadService::new(
        pool.clone(),
        storage_service,
        audit_service.clone(),
        ledger_service.clone(),
        settings_service.clone(),
    );
    let redemption_service = RedemptionService::new(
        pool.clone(),
        audit_service.clone(),
        ledger_service.clone(),
        settings_service.clone(),
    );
    let stats_service = StatsService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(audit_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(program_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .app_data(web::Data::new(redemption_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::loyalty_config)
                    .configure(handlers::upload_config)
                    .configure(handlers::redemption_config)
                    .configure(handlers::program_config)
                    .configure(handlers::admin_config)
                    .configure(handlers::super_admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
