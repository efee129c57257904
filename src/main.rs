// src/main.rs
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taller::config::{load_config, Config};
use taller::error::{route_not_found, ErrorNormalizer, NormalizeErrors};
use taller::monitoring::{self, Metrics, RequestLogger};
use taller::handlers;

// ==================== MAIN ====================

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (this calls load_env_file internally)
    let config = load_config()?;

    setup_logging(&config)?;
    config.print_startup_info();

    let normalizer = ErrorNormalizer::new(config.environment);
    let metrics = Arc::new(Metrics::new());

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Starting server at http://{}", bind_address);

    let app_config = config.clone();
    let mut server = HttpServer::new(move || {
        let cors = setup_cors(&app_config.security.allowed_origins);

        App::new()
            .wrap(NormalizeErrors::new(normalizer))
            .wrap(RequestLogger::new(metrics.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::from(metrics.clone()))
            .app_data(handlers::json_config(app_config.security.max_request_size))
            .app_data(handlers::query_config())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(monitoring::health_check))
                    .route("/metrics", web::get().to(monitoring::metrics_endpoint))
                    .configure(handlers::configure_api),
            )
            .default_service(web::route().to(route_not_found))
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server failed to run")?;

    Ok(())
}

// ==================== HELPER FUNCTIONS ====================

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.logging.level.as_str();
        tracing_subscriber::EnvFilter::new(level)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

fn setup_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_LENGTH])
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        log::warn!("⚠️  CORS allows any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
