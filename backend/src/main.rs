mod classifier;
mod config;
mod error;
mod pages;
mod routes;

use actix_web::{App, HttpServer, web};

use classifier::model::Classifier;
use config::AppConfig;
use routes::{configure_routes, error_handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = std::env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = AppConfig::from_env();
    config.ensure_upload_dir()?;

    // A missing or broken artifact degrades the process instead of killing
    // it; classify requests then answer with a model-unavailable message.
    let classifier = Classifier::load_or_disabled(&config.model_path);

    let bind_address = config.bind_address.clone();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let static_dir = config.static_dir.clone();
        App::new()
            .wrap(error_handlers())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(classifier.clone()))
            .configure(|cfg| configure_routes(cfg, static_dir))
    })
    .bind(&bind_address)?
    .run()
    .await
}
