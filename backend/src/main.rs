use actix_cors::Cors;
use actix_web::{web, App, HttpServer, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod database;
mod error;
mod handlers;
mod models;
mod services;
mod utils;

use config::AppConfig;
use database::Database;
use error::AppError;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    info!(
        "Starting Tour Platform Backend on {}:{}",
        config.host, config.port
    );

    let database = Database::new(&config.database_url).await?;
    database.migrate().await?;

    let notification_service = services::NotificationService::new(&config);
    notification_service.start_background_tasks();

    let payment_service = services::PaymentService::new(
        &config,
        database.pool().clone(),
        notification_service.clone(),
    )?;
    let booking_service = services::BookingService::new(
        database.pool().clone(),
        payment_service.clone(),
        notification_service.clone(),
    );
    let availability_service = services::AvailabilityService::new(database.pool().clone());

    let bind_addr = (config.host.clone(), config.port);
    let frontend_origin = config.frontend_base_url.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(database.clone()))
            .app_data(web::Data::new(availability_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .service(
                web::scope("/api/v1")
                    .service(handlers::health::health_check)
                    .route(
                        "/tours/{slug}/availability",
                        web::get().to(handlers::bookings::get_availability),
                    )
                    .route(
                        "/tours/{slug}/bookings",
                        web::post().to(handlers::bookings::create_booking),
                    )
                    .route(
                        "/tours/{slug}/reviews",
                        web::post().to(handlers::reviews::create_review),
                    )
                    .route("/contact", web::post().to(handlers::contact::create_contact)),
            )
            .service(
                web::scope("/payments")
                    .service(handlers::payments::momo_redirect)
                    .service(handlers::payments::momo_ipn),
            )
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
