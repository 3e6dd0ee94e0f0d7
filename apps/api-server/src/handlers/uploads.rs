//! File upload handler and the multipart reader shared with the avatar route.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::{StreamExt, TryStreamExt};

use fakebook_core::services::{IncomingFile, MAX_UPLOAD_BYTES, UploadArea};
use fakebook_shared::ApiResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::profile::ActiveProfile;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// Buffer the `file` field of a multipart body. Other fields are drained and ignored.
pub async fn read_file(mut payload: Multipart) -> AppResult<IncomingFile> {
    let bad_multipart = |e: actix_multipart::MultipartError| AppError::BadRequest(e.to_string());

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        if field.name() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(bad_multipart)?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the {} MB limit",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(IncomingFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

/// POST /api/v1/fakebook/upload
pub async fn upload(
    state: web::Data<AppState>,
    active: ActiveProfile,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let file = read_file(payload).await?;
    let uploaded = state
        .uploads
        .upload(active.profile.profile_id, file, UploadArea::Uploads)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(uploaded)))
}
