use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use deck_pptx::{DeckReader, ReportGenerator};
use deck_server::config::Config;
use deck_server::handlers::AppState;
use deck_server::{configure, cors_headers};
use serde_json::{json, Value};
use std::path::Path;

fn state(public_dir: &Path, tweak: impl FnOnce(&mut Config)) -> web::Data<AppState> {
    let mut config = Config {
        public_dir: public_dir.to_path_buf(),
        ..Config::default()
    };
    tweak(&mut config);
    let generator = ReportGenerator::new(&config.generator_options()).unwrap();
    web::Data::new(AppState { generator, config })
}

fn sample_payload() -> Value {
    json!({
        "meta": { "title": "Weekly Media Report", "footerTitle": "ACME Corp" },
        "slides": [
            {
                "type": "table",
                "sectionTitle": "Coverage",
                "tableTitle": "Print Media",
                "rows": [{
                    "date": "2024-01-02",
                    "publication": "Daily News",
                    "title": "Plant opening",
                    "link": "https://news.example.com/1",
                    "summary": ["New plant opens", "200 jobs"],
                    "sentiment": "Positive",
                    "remarks": "-"
                }]
            },
            { "type": "text", "title": "Notes", "content": "Coverage was steady." }
        ]
    })
}

#[actix_web::test]
async fn test_health_has_cors_headers() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .wrap(cors_headers())
            .configure(configure(state(tmp.path(), |_| {}))),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );
    let body = test::read_body(resp).await;
    assert_eq!(body, "Report deck API is running");
}

#[actix_web::test]
async fn test_preflight_returns_no_content() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .wrap(cors_headers())
            .configure(configure(state(tmp.path(), |_| {}))),
    )
    .await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/generateReporting")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.headers().contains_key("Access-Control-Allow-Methods"));
}

#[actix_web::test]
async fn test_empty_body_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;

    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("No data provided"));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;

    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_generate_saves_and_serves_deck() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;

    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .insert_header(("host", "reports.local:8080"))
        .set_json(sample_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Report generated successfully");
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("report-") && filename.ends_with(".pptx"));
    assert_eq!(
        body["downloadUrl"],
        format!("http://reports.local:8080/download/{}", filename)
    );

    let saved = std::fs::read(tmp.path().join(&filename)).unwrap();
    let deck = DeckReader::new().read_bytes(&saved).unwrap();
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(deck.title.as_deref(), Some("Weekly Media Report"));

    let req = test::TestRequest::get()
        .uri(&format!("/download/{}", filename))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(bytes.len(), saved.len());
}

#[actix_web::test]
async fn test_download_url_uses_base_url() {
    let tmp = tempfile::tempdir().unwrap();
    let state = state(tmp.path(), |config| {
        config.base_url = Some("https://decks.example.com".to_string());
    });
    let app = test::init_service(App::new().configure(configure(state))).await;

    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(json!({ "title": "Legacy", "rows": sample_payload()["slides"][0]["rows"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let url = body["downloadUrl"].as_str().unwrap();
    assert!(url.starts_with("https://decks.example.com/download/report-"));
}

#[actix_web::test]
async fn test_unknown_slide_type() {
    let payload = json!({
        "slides": [
            { "type": "chart", "data": [1, 2, 3] },
            { "type": "text", "title": "Notes", "content": "Still here" }
        ]
    });

    // Skipped by default
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;
    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let saved = std::fs::read(tmp.path().join(body["filename"].as_str().unwrap())).unwrap();
    assert_eq!(DeckReader::new().read_bytes(&saved).unwrap().slide_count(), 1);

    // Rejected when strict
    let strict_dir = tempfile::tempdir().unwrap();
    let state = state(strict_dir.path(), |config| config.strict_slides = true);
    let app = test::init_service(App::new().configure(configure(state))).await;
    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("chart"));
}

const BOUNDARY: &str = "----deck-test-boundary";

fn png(width: u32, height: u32) -> Vec<u8> {
    let img: image::RgbImage = image::ImageBuffer::new(width, height);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A multipart/form-data body with one file field.
fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload-logo")
        .insert_header(("host", "reports.local:8080"))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

#[actix_web::test]
async fn test_upload_logo_saves_and_serves_image() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;
    let logo = png(40, 20);

    let resp = test::call_service(
        &app,
        upload_request(multipart_body("logo", "brand.png", "image/png", &logo)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logo uploaded successfully");
    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("logo-") && filename.ends_with(".png"), "{}", filename);
    assert_eq!(
        body["url"],
        format!("http://reports.local:8080/download/uploads/{}", filename)
    );
    assert_eq!(std::fs::read(tmp.path().join("uploads").join(&filename)).unwrap(), logo);

    let req = test::TestRequest::get()
        .uri(&format!("/download/uploads/{}", filename))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await.len(), logo.len());

    // the stored file can be named as a deck logo
    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(json!({
            "meta": { "logo": format!("uploads/{}", filename) },
            "slides": [{ "type": "text", "content": "Body" }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let saved = std::fs::read(tmp.path().join(body["filename"].as_str().unwrap())).unwrap();
    assert!(DeckReader::new().read_bytes(&saved).unwrap().slides[0].layout_has_picture);
}

#[actix_web::test]
async fn test_upload_without_logo_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;

    let resp = test::call_service(
        &app,
        upload_request(multipart_body("other", "brand.png", "image/png", &png(4, 4))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file uploaded");
    assert!(!tmp.path().join("uploads").exists());
}

#[actix_web::test]
async fn test_upload_of_non_image_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path(), |_| {})))).await;

    let resp = test::call_service(
        &app,
        upload_request(multipart_body("logo", "notes.png", "image/png", b"just some text")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("not a supported image"));
}

#[actix_web::test]
async fn test_logo_path_outside_public_dir_is_ignored() {
    let public = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let secret = elsewhere.path().join("secret.png");
    std::fs::write(&secret, png(8, 8)).unwrap();
    let app = test::init_service(App::new().configure(configure(state(public.path(), |_| {})))).await;

    let req = test::TestRequest::post()
        .uri("/generateReporting")
        .set_json(json!({
            "meta": { "logo": secret.to_str().unwrap() },
            "slides": [{ "type": "text", "content": "Body" }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let saved = std::fs::read(public.path().join(body["filename"].as_str().unwrap())).unwrap();
    assert!(!DeckReader::new().read_bytes(&saved).unwrap().slides[0].layout_has_picture);
}
