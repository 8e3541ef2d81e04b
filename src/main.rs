use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;

use jobmarkt_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::PaystackService,
    handlers,
    logging::init_logger,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    if config.paystack.secret_key.is_empty() {
        log::warn!("PAYSTACK_SECRET_KEY is empty, all webhooks will be rejected");
    }

    // 创建外部服务
    let paystack_service =
        PaystackService::new(config.paystack.clone()).expect("Failed to create Paystack client");

    // 创建服务
    let draw_service = DrawService::new(pool.clone(), config.draw.minimum_participants);
    let eligibility_service = EligibilityService::new(pool.clone(), draw_service.clone());
    let ledger_service = LedgerService::new(pool.clone());
    let payment_service = PaymentService::new(
        pool.clone(),
        Arc::new(paystack_service.clone()),
        ledger_service,
        eligibility_service.clone(),
        paystack_service.callback_url(),
        paystack_service.monthly_amount(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(paystack_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(eligibility_service.clone()))
            .configure(swagger_config)
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::payment_config)
                    .configure(handlers::draw_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
