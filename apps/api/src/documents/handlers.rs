//! Axum route handler for document field extraction.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::documents::prompts::{attached_document_prompt, extracted_text_prompt};
use crate::documents::upload::{read_upload, DocumentKind, UploadedDocument};
use crate::errors::AppError;
use crate::llm_client::normalize::{normalize, ReplyShape};
use crate::llm_client::{generate_json, GenerationRequest, TextGenerator};
use crate::state::AppState;

/// Extraction wants verbatim reading, not creativity.
const EXTRACTION_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    pub extracted_data: Value,
}

/// POST /ocr
///
/// Accepts a multipart upload (`file` field) holding an image or a PDF and
/// returns the student fields the model could read from it.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, AppError> {
    let upload_id = Uuid::new_v4();

    async move {
        let upload = read_upload(&mut multipart).await?;
        info!(
            file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
            mime_type = upload.kind.mime_type(),
            size = upload.bytes.len(),
            "Received document"
        );

        let extracted_data = extract_fields(state.llm.as_ref(), upload).await?;
        Ok::<_, AppError>(Json(ExtractionResponse { extracted_data }))
    }
    .instrument(info_span!("ocr", %upload_id))
    .await
}

pub async fn extract_fields(
    llm: &dyn TextGenerator,
    upload: UploadedDocument,
) -> Result<Value, AppError> {
    match upload.kind {
        DocumentKind::Image(format) => {
            let request = attached_request(format.mime_type(), upload.bytes);
            generate_json(llm, &request, ReplyShape::Structured).await
        }
        DocumentKind::Pdf => extract_pdf_fields(llm, upload.bytes).await,
    }
}

fn attached_request(mime_type: &str, bytes: Bytes) -> GenerationRequest {
    GenerationRequest::text(attached_document_prompt())
        .with_attachment(mime_type, bytes)
        .with_temperature(EXTRACTION_TEMPERATURE)
}

/// Sends the PDF inline first. If the model cannot take it, falls back to the
/// PDF's own text layer. Any failure on the fallback path is reported as a
/// client error since the document itself is the likely cause.
async fn extract_pdf_fields(llm: &dyn TextGenerator, bytes: Bytes) -> Result<Value, AppError> {
    let request = attached_request(DocumentKind::Pdf.mime_type(), bytes.clone());
    let reply = match llm.generate(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Inline PDF extraction failed, falling back to text layer: {e}");
            let text = pdf_text(bytes).await?;
            info!(chars = text.len(), "Extracted text from PDF");

            let request = GenerationRequest::text(extracted_text_prompt(&text))
                .with_temperature(EXTRACTION_TEMPERATURE);
            llm.generate(&request)
                .await
                .map_err(|e| AppError::Validation(format!("Could not process PDF: {e}")))?
        }
    };

    Ok(normalize(&reply, ReplyShape::Structured)?)
}

/// Pulls the text layer out of a PDF on the blocking pool.
async fn pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Validation(format!("Could not process PDF: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not process PDF: {e}")))?;

    if extracted.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not process PDF: no extractable text".to_string(),
        ));
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::upload::ImageFormat;
    use crate::llm_client::fake::ScriptedGenerator;
    use crate::llm_client::LlmError;
    use serde_json::json;

    fn upload(kind: DocumentKind, bytes: &'static [u8]) -> UploadedDocument {
        UploadedDocument {
            file_name: Some("doc".to_string()),
            kind,
            bytes: Bytes::from_static(bytes),
        }
    }

    #[tokio::test]
    async fn test_image_is_attached_with_low_temperature() {
        let llm = ScriptedGenerator::replying("```json\n{\"name\": \"Meera\", \"cgpa\": \"9.0\"}\n```");
        let doc = upload(DocumentKind::Image(ImageFormat::Png), b"\x89PNG\r\n\x1a\n");

        let value = extract_fields(&llm, doc).await.unwrap();
        assert_eq!(value, json!({"name": "Meera", "cgpa": "9.0"}));

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].attachments[0].mime_type, "image/png");
        assert_eq!(requests[0].temperature, Some(EXTRACTION_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_pdf_sent_inline_when_model_accepts_it() {
        let llm = ScriptedGenerator::replying("{\"name\": \"Kabir\"}");
        let doc = upload(DocumentKind::Pdf, b"%PDF-1.4\n");

        let value = extract_fields(&llm, doc).await.unwrap();
        assert_eq!(value, json!({"name": "Kabir"}));
        assert_eq!(llm.requests()[0].attachments[0].mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_fallback_is_client_error() {
        let llm = ScriptedGenerator::new(vec![Err(LlmError::Api {
            status: 400,
            message: "unsupported document".to_string(),
        })]);
        let doc = upload(DocumentKind::Pdf, b"%PDF-1.4 truncated garbage");

        let err = extract_fields(&llm, doc).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("Could not process PDF")),
            other => panic!("unexpected error: {other:?}"),
        }
        // no second model call without extracted text
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported() {
        let llm = ScriptedGenerator::replying("I could not read this document.");
        let doc = upload(DocumentKind::Image(ImageFormat::Jpeg), b"\xff\xd8\xff");

        let err = extract_fields(&llm, doc).await.unwrap_err();
        assert!(matches!(err, AppError::ModelReply(_)));
    }
}
