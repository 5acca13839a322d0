use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use cv_job_matcher::config::Settings;
use cv_job_matcher::core::Matcher;
use cv_job_matcher::render::ReportWriter;
use cv_job_matcher::routes::{self, AppState};
use cv_job_matcher::services::ExtractionClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting CV job matcher...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error(format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    // Alias table is read-only for the lifetime of the process
    let aliases = settings.normalizer.load_aliases().map_err(|e| {
        error!("Failed to load alias table: {}", e);
        io_error(format!("Alias table error: {}", e))
    })?;

    info!("Alias table loaded ({} entries)", aliases.len());

    let matcher = Matcher::new(aliases);

    let extractor = match settings.extraction.api_key.clone() {
        Some(api_key) => {
            let client = ExtractionClient::new(
                settings.extraction.endpoint.clone(),
                api_key,
                settings.extraction.model.clone(),
                Duration::from_secs(settings.extraction.timeout_secs),
                settings.extraction.max_retries,
            )
            .map_err(|e| io_error(format!("Extraction client error: {}", e)))?;
            info!("Extraction client initialized (model: {})", settings.extraction.model);
            Some(Arc::new(client))
        }
        None => {
            warn!("No extraction API key configured, document and PDF matching are disabled");
            None
        }
    };

    let writer = settings.output.dir.clone().map(|dir| {
        info!("Reports will be written to {}", dir);
        ReportWriter::new(dir)
    });

    let app_state = AppState {
        matcher,
        extractor,
        writer,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(routes::multipart_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
