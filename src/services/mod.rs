// src/services/mod.rs
pub mod llm_service;
pub mod ocr_service;
pub mod upload_store;

pub use llm_service::LLMService;
pub use ocr_service::OcrService;
pub use upload_store::UploadStore;
