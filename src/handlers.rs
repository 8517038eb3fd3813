// src/handlers.rs
use crate::{AppState, errors::TextLensError, models::*};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use log::info;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Server is running" }))
}

/// POST /upload: validate the image, store it, OCR it, analyze the text.
pub async fn upload_image(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, TextLensError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await? {
        let content_disposition = field.content_disposition();
        let Some(filename) = content_disposition.get_filename().map(|f| f.to_string()) else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(TextLensError::Validation(format!(
                "Unsupported file type '{}': only images are accepted",
                content_type
            )));
        }

        // Enforce the size ceiling while draining the stream so an
        // oversized payload is rejected before anything touches disk.
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(TextLensError::Validation(format!(
                    "File exceeds the {} MiB upload limit",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(TextLensError::Validation(
            "No image file provided".to_string(),
        ));
    };

    // The MIME header is client-supplied; confirm the bytes actually look
    // like an image before storing them.
    if image::guess_format(&bytes).is_err() {
        return Err(TextLensError::Validation(
            "Uploaded file is not a recognizable image".to_string(),
        ));
    }

    let stored = data.upload_store.save(&filename, &bytes).await?;
    info!(
        "Stored upload '{}' as {} ({} bytes)",
        stored.name,
        stored.path.display(),
        stored.size
    );

    let raw_text = data.ocr_service.extract_text(&stored.path).await?;
    let extraction = ExtractedText::from_raw(raw_text);
    if extraction.is_empty() {
        return Err(TextLensError::NoTextExtracted);
    }

    let analysis = data.llm_service.analyze_text(&extraction.raw).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": {
            "file": stored,
            "textExtraction": extraction,
            "analysis": analysis,
        }
    })))
}

/// POST /chat: free-form question answered against a caller-supplied
/// analysis context, plain-text reply.
pub async fn chat(
    body: web::Json<ChatRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, TextLensError> {
    let question = body
        .question
        .as_deref()
        .ok_or_else(|| TextLensError::MissingField("question".to_string()))?;
    let context = body
        .analysis_context
        .as_ref()
        .ok_or_else(|| TextLensError::MissingField("analysisContext".to_string()))?;

    let response = data.llm_service.chat(question, context).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "response": response,
    })))
}

/// POST /ask: like /chat but returns a structured answer, degrading to a
/// low-confidence fallback when the model's reply is not parseable.
pub async fn ask(
    body: web::Json<AskRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, TextLensError> {
    let question = body
        .question
        .as_deref()
        .ok_or_else(|| TextLensError::MissingField("question".to_string()))?;
    let context = body
        .analysis_context
        .as_ref()
        .ok_or_else(|| TextLensError::MissingField("analysisContext".to_string()))?;

    // Structural shape check only; the context is otherwise opaque.
    if !context["textExtraction"].is_object() {
        return Err(TextLensError::InvalidContext(
            "analysisContext is missing the textExtraction object".to_string(),
        ));
    }
    if !context["analysis"].is_object() {
        return Err(TextLensError::InvalidContext(
            "analysisContext is missing the analysis object".to_string(),
        ));
    }

    let answer = data.llm_service.ask(question, context).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "timestamp": chrono::Utc::now(),
        "question": question,
        "analysis": answer,
    })))
}
