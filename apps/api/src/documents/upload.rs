//! Upload intake for the extraction endpoint: pulls the `file` field out of a
//! multipart body and works out what kind of document it is.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

/// Multipart field the client puts the document in.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Identifies an image from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const SIGNATURES: &[(&[u8], ImageFormat)] = &[
            (b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
            (b"\xff\xd8\xff", ImageFormat::Jpeg),
            (b"GIF87a", ImageFormat::Gif),
            (b"GIF89a", ImageFormat::Gif),
            (b"BM", ImageFormat::Bmp),
            (b"II*\0", ImageFormat::Tiff),
            (b"MM\0*", ImageFormat::Tiff),
        ];

        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        SIGNATURES
            .iter()
            .find(|(magic, _)| bytes.starts_with(magic))
            .map(|(_, format)| *format)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(ImageFormat),
}

impl DocumentKind {
    /// PDFs are recognized by declared content type or by the `%PDF-`
    /// header. Images are only accepted when their bytes look like one,
    /// whatever the client declared.
    pub fn detect(content_type: Option<&str>, bytes: &[u8]) -> Option<Self> {
        let declared_pdf = content_type
            .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false);
        if declared_pdf || bytes.starts_with(b"%PDF-") {
            return Some(DocumentKind::Pdf);
        }
        ImageFormat::sniff(bytes).map(DocumentKind::Image)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Image(format) => format.mime_type(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

/// Reads the `file` field and classifies it. Other fields are ignored.
pub async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("Empty file uploaded".to_string()));
        }

        let kind = DocumentKind::detect(content_type.as_deref(), &bytes).ok_or_else(|| {
            AppError::Validation(
                "Invalid image file. Please upload JPG, PNG, or PDF.".to_string(),
            )
        })?;

        return Ok(UploadedDocument {
            file_name,
            kind,
            bytes,
        });
    }

    Err(AppError::Validation(format!(
        "Missing '{FILE_FIELD}' field in multipart body"
    )))
}
