use crate::config::Config;
use crate::errors::AppError;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use deck_core::{normalize_request, ImageFormat};
use deck_pptx::ReportGenerator;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Shared by every worker.
pub struct AppState {
    pub generator: ReportGenerator,
    pub config: Config,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: String,
    pub filename: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub filename: String,
}

#[derive(MultipartForm)]
pub struct LogoUpload {
    #[multipart(limit = "10 MiB")]
    pub logo: Option<TempFile>,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Report deck API is running")
}

/// Answer CORS preflight requests; the headers come from the app-wide
/// default headers.
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// POST /generateReporting
pub async fn generate_reporting(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let payload = normalize_request(body.into_inner())?;
    log::info!("Generating report with {} slide(s)", payload.slides.len());

    let deck = state.generator.generate(&payload).await?;

    let dir = state.config.public_dir.clone();
    let (filename, path) = web::block(move || save_deck(&dir, &deck))
        .await
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))??;
    log::info!("Report saved to {}", path.display());

    Ok(HttpResponse::Ok().json(GenerateResponse {
        message: "Report generated successfully".to_string(),
        download_url: format!("{}/download/{}", base_url(&state.config, &req), filename),
        filename,
    }))
}

/// POST /upload-logo
///
/// Stores the `logo` field under the uploads directory. The stored file can
/// then be used as a deck logo by its download URL or its path.
pub async fn upload_logo(
    state: web::Data<AppState>,
    req: HttpRequest,
    MultipartForm(form): MultipartForm<LogoUpload>,
) -> Result<HttpResponse, AppError> {
    let logo = form
        .logo
        .filter(|file| file.size > 0)
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    log::info!(
        "Receiving logo {:?} ({} bytes)",
        logo.file_name.as_deref().unwrap_or("unnamed"),
        logo.size
    );

    let dir = state.config.uploads_dir();
    let (filename, path) = web::block(move || -> Result<(String, PathBuf), AppError> {
        let data = std::fs::read(logo.file.path())?;
        let format = ImageFormat::from_magic(&data)
            .ok_or_else(|| AppError::BadRequest("Uploaded file is not a supported image".to_string()))?;
        Ok(save_logo(&dir, &data, format)?)
    })
    .await
    .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))??;
    log::info!("Logo saved to {}", path.display());

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Logo uploaded successfully".to_string(),
        url: format!("{}/download/uploads/{}", base_url(&state.config, &req), filename),
        filename,
    }))
}

/// The configured base URL, or the scheme and host the request came in on.
fn base_url(config: &Config, req: &HttpRequest) -> String {
    match &config.base_url {
        Some(url) => url.clone(),
        None => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    }
}

/// Save `deck` as `report-<unix-millis>.pptx` in `dir`, creating the
/// directory if needed. A numeric suffix keeps two decks saved within the
/// same millisecond apart.
fn save_deck(dir: &Path, deck: &[u8]) -> std::io::Result<(String, PathBuf)> {
    let stamp = Utc::now().timestamp_millis();
    save_new(dir, deck, |attempt| {
        if attempt == 0 {
            format!("report-{}.pptx", stamp)
        } else {
            format!("report-{}-{}.pptx", stamp, attempt)
        }
    })
}

/// Save an uploaded logo as `logo-<unix-millis>-<random>.<ext>`.
fn save_logo(dir: &Path, data: &[u8], format: ImageFormat) -> std::io::Result<(String, PathBuf)> {
    let stamp = Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    save_new(dir, data, |_| {
        format!(
            "logo-{}-{}.{}",
            stamp,
            rng.random_range(0..1_000_000_000u32),
            format.extension()
        )
    })
}

/// Write `data` to the first name from `name` that does not exist in `dir`
/// yet. `name` gets the attempt number, starting at 0.
fn save_new(
    dir: &Path,
    data: &[u8],
    mut name: impl FnMut(u32) -> String,
) -> std::io::Result<(String, PathBuf)> {
    std::fs::create_dir_all(dir)?;

    for attempt in 0u32.. {
        let filename = name(attempt);
        let path = dir.join(&filename);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(data)?;
                return Ok((filename, path));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::other("no free file name"))
}
