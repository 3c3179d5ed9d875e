use actix_web::{middleware, web, App, HttpServer};
use deck_pptx::ReportGenerator;
use deck_server::config::Config;
use deck_server::handlers::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    // Ensure the download directory exists
    std::fs::create_dir_all(&config.public_dir)?;

    let generator = ReportGenerator::new(&config.generator_options())
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bind = (config.bind_addr.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!("Serving decks from {}", config.public_dir.display());

    let state = web::Data::new(AppState { generator, config });

    HttpServer::new(move || {
        App::new()
            .wrap(deck_server::cors_headers())
            .wrap(middleware::Logger::default())
            .configure(deck_server::configure(state.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
