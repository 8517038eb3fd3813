// src/services/ocr_service.rs
use crate::errors::TextLensError;
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};
use tesseract::Tesseract;

pub const DEFAULT_OCR_LANG: &str = "eng";
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

/// Tesseract-backed text extraction.
///
/// The engine instance is created per request inside the blocking closure
/// and dropped on every exit path, so recognition of one image never holds
/// resources for another. Recognition runs on the blocking thread pool and
/// is bounded by a timeout so a pathological image cannot hold a request
/// open indefinitely.
pub struct OcrService {
    lang: String,
    timeout: Duration,
}

impl OcrService {
    pub fn new(lang: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            lang: lang.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub async fn extract_text(&self, image_path: &Path) -> Result<String, TextLensError> {
        let lang = self.lang.clone();
        let path = image_path
            .to_str()
            .ok_or_else(|| {
                TextLensError::Processing("Upload path is not valid UTF-8".to_string())
            })?
            .to_string();

        let start = Instant::now();

        let recognition = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || -> Result<String, TextLensError> {
                let mut engine = Tesseract::new(None, Some(&lang))
                    .map_err(|e| {
                        TextLensError::Processing(format!("Failed to initialize OCR engine: {}", e))
                    })?
                    .set_image(&path)
                    .map_err(|e| {
                        TextLensError::Processing(format!(
                            "Failed to load image into OCR engine: {}",
                            e
                        ))
                    })?;

                engine
                    .get_text()
                    .map_err(|e| TextLensError::Processing(format!("OCR recognition failed: {}", e)))
            }),
        )
        .await;

        match recognition {
            Ok(Ok(result)) => {
                let text = result?;
                info!(
                    "OCR completed in {}ms, recognized {} characters",
                    start.elapsed().as_millis(),
                    text.chars().count()
                );
                Ok(text)
            }
            Ok(Err(join_err)) => Err(TextLensError::Processing(format!(
                "OCR task failed: {}",
                join_err
            ))),
            Err(_) => {
                warn!(
                    "OCR timed out after {}s for {}",
                    self.timeout.as_secs(),
                    image_path.display()
                );
                Err(TextLensError::Timeout(format!(
                    "OCR did not complete within {} seconds",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}
