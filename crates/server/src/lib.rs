//! HTTP API that renders report payloads into downloadable decks.

pub mod config;
pub mod errors;
pub mod handlers;

use actix_multipart::form::MultipartFormConfig;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::web;
use errors::AppError;
use handlers::AppState;

/// Largest accepted JSON body. Inline `data:` logos make payloads large.
const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Largest accepted logo upload, including the multipart framing.
const UPLOAD_LIMIT: usize = 11 * 1024 * 1024;

/// Permissive CORS headers added to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

/// Register the API routes and the download directory for `state`.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let public_dir = state.config.public_dir.clone();
        let json = web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
        let multipart = MultipartFormConfig::default()
            .total_limit(UPLOAD_LIMIT)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

        cfg.app_data(state)
            .app_data(json)
            .app_data(multipart)
            .route("/", web::get().to(handlers::health))
            .route("/generateReporting", web::post().to(handlers::generate_reporting))
            .route(
                "/generateReporting",
                web::method(Method::OPTIONS).to(handlers::preflight),
            )
            .route("/upload-logo", web::post().to(handlers::upload_logo))
            .route("/upload-logo", web::method(Method::OPTIONS).to(handlers::preflight))
            .service(actix_files::Files::new("/download", public_dir));
    }
}
