//! Image analysis endpoints
//!
//! Both routes feed the same pipeline: `/api/analyze` takes a data URI in a
//! JSON body, `/api/analyze-upload` takes a multipart file and builds the
//! data URI itself.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Extension, Json,
};
use base64::{engine::general_purpose, Engine as _};
use cleancheck_common::Inspection;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::extract::JsonBody;
use crate::error::{ApiError, ApiResult};
use crate::services::{AnalysisRequest, AuthUser};
use crate::AppState;

/// Largest accepted upload, in bytes
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted upload types, as sniffed from the file contents
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Content types a client may declare; `image/jpg` is a common non-standard alias
pub const DECLARED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(request): JsonBody<AnalyzeRequest>,
) -> ApiResult<Json<Inspection>> {
    let analysis = AnalysisRequest {
        image_data: request.image_data,
        task_type: request.task_type,
        metadata: metadata_object(request.metadata)?,
    };

    let inspection = state.pipeline.analyze(analysis, &user).await?;
    Ok(Json(inspection))
}

/// POST /api/analyze-upload
///
/// Multipart fields: `image` (file), `taskType`, `metadata` (JSON string).
/// The file is held in memory only for the duration of the request.
pub async fn analyze_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Inspection>> {
    let mut multipart = multipart?;
    let mut image_data = None;
    let mut task_type = None;
    let mut metadata = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("image") => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                image_data = Some(image_data_uri(declared.as_deref(), &bytes)?);
            }
            Some("taskType") => {
                task_type = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("metadata") => {
                let text = field.text().await.map_err(multipart_error)?;
                metadata = parse_metadata_field(&text)?;
            }
            _ => {}
        }
    }

    let analysis = AnalysisRequest {
        image_data,
        task_type,
        metadata,
    };

    let inspection = state.pipeline.analyze(analysis, &user).await?;
    Ok(Json(inspection))
}

/// Validate an uploaded image and encode it as a data URI
///
/// Both the declared content type and the sniffed magic bytes must be an
/// accepted image type.
pub fn image_data_uri(declared: Option<&str>, bytes: &[u8]) -> ApiResult<String> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded image is empty".to_string()));
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds the {} MB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    let declared_ok = declared
        .map(|ct| DECLARED_IMAGE_TYPES.contains(&ct.trim().to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
    let mime = match sniffed {
        Some(mime) if declared_ok && ALLOWED_IMAGE_TYPES.contains(&mime) => mime,
        _ => {
            return Err(ApiError::BadRequest(
                "Invalid file type. Only JPEG, PNG, and WebP are allowed.".to_string(),
            ))
        }
    };

    Ok(format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Parse the upload form's metadata string; blank means none
fn parse_metadata_field(text: &str) -> ApiResult<Option<Map<String, Value>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ApiError::BadRequest(format!("Invalid metadata JSON: {}", e)))?;
    metadata_object(Some(value))
}

/// Metadata must be a JSON object when present
fn metadata_object(value: Option<Value>) -> ApiResult<Option<Map<String, Value>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ApiError::BadRequest(
            "metadata must be a JSON object".to_string(),
        )),
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid upload: {}", e.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[test]
    fn test_png_becomes_data_uri() {
        let uri = image_data_uri(Some("image/png"), &PNG_HEADER).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_declared_type_must_be_allowed() {
        assert!(image_data_uri(Some("application/pdf"), &PNG_HEADER).is_err());
        assert!(image_data_uri(None, &PNG_HEADER).is_err());
    }

    #[test]
    fn test_jpg_alias_is_accepted() {
        const JPEG_HEADER: [u8; 12] = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
        ];
        let uri = image_data_uri(Some("image/jpg"), &JPEG_HEADER).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_magic_bytes_must_match_an_image() {
        let err = image_data_uri(Some("image/jpeg"), b"just some plain text").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        assert!(image_data_uri(Some("image/png"), &bytes).is_err());
    }

    #[test]
    fn test_metadata_field_parsing() {
        assert_eq!(parse_metadata_field("").unwrap(), None);
        let map = parse_metadata_field(r#"{"room": "B-204"}"#).unwrap().unwrap();
        assert_eq!(map["room"], "B-204");
        assert!(parse_metadata_field("{not json").is_err());
        assert!(parse_metadata_field("[1, 2]").is_err());
    }
}
