// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use log::info;
use std::sync::Arc;

mod errors;
mod handlers;
mod models;
mod services;

use crate::handlers::{ask, chat, root, upload_image};
use crate::services::{LLMService, OcrService, UploadStore};
use crate::services::llm_service::{DEFAULT_MODEL, DEFAULT_OPENAI_URL};
use crate::services::ocr_service::{DEFAULT_OCR_LANG, DEFAULT_OCR_TIMEOUT_SECS};

#[derive(Clone)]
pub struct AppState {
    pub llm_service: Arc<LLMService>,
    pub ocr_service: Arc<OcrService>,
    pub upload_store: Arc<UploadStore>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting TextLens service...");

    // Missing credential is the one startup condition that is fatal.
    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
    let base_url =
        std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    let ocr_lang = std::env::var("TESSERACT_LANG").unwrap_or_else(|_| DEFAULT_OCR_LANG.to_string());
    let ocr_timeout = std::env::var("OCR_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_OCR_TIMEOUT_SECS);
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app_state = AppState {
        llm_service: Arc::new(LLMService::new(api_key, base_url, model)),
        ocr_service: Arc::new(OcrService::new(ocr_lang, ocr_timeout)),
        upload_store: Arc::new(UploadStore::new(upload_dir)),
    };

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(root))
            .route("/upload", web::post().to(upload_image))
            .route("/chat", web::post().to(chat))
            .route("/ask", web::post().to(ask))
    })
    .bind(bind_addr)?
    .run()
    .await
}
