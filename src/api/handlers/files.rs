use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::credential::with_session;
use crate::services::identity::Credential;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    /// Shown once; required for every download
    pub access_code: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct FileListItem {
    pub id: String,
    pub filename: String,
    pub access_code: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    /// Access code handed out at upload time
    pub code: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file or unusable filename"),
        (status = 401, description = "Credential required"),
        (status = 413, description = "File too large")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, content));
        break;
    }

    // Browsers send an empty filename when the picker was left blank
    let (filename, content) = upload
        .filter(|(filename, _)| !filename.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file selected".to_string()))?;

    let stored = state
        .service
        .put(&credential, &filename, content)
        .await
        .map_err(|e| AppError::from_drop(e, state.config.hide_foreign_records))?;

    let record = &stored.value;
    let body = UploadResponse {
        id: record.id.clone(),
        filename: record.filename.clone(),
        access_code: record.access_code.clone(),
        size: record.size() as i64,
        created_at: record.created_at,
        expires_at: record.created_at + state.service.retention(),
    };

    Ok(with_session(stored.minted_session, Json(body)))
}

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Caller's live files, newest first", body = Vec<FileListItem>),
        (status = 401, description = "Credential required")
    ),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
) -> Result<Response, AppError> {
    let listed = state
        .service
        .list(&credential)
        .await
        .map_err(|e| AppError::from_drop(e, state.config.hide_foreign_records))?;

    let retention = state.service.retention();
    let items: Vec<FileListItem> = listed
        .value
        .into_iter()
        .map(|summary| FileListItem {
            expires_at: summary.created_at + retention,
            id: summary.id,
            filename: summary.filename,
            access_code: summary.access_code,
            size: summary.size,
            created_at: summary.created_at,
        })
        .collect();

    Ok(with_session(listed.minted_session, Json(items)))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    params(
        ("id" = String, Path, description = "File id"),
        ("code" = Option<String>, Query, description = "Access code handed out at upload time")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Wrong access code"),
        (status = 404, description = "File not found or expired")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let fetched = state
        .service
        .get(&credential, &id, query.code.as_deref())
        .await
        .map_err(|e| AppError::from_drop(e, state.config.hide_foreign_records))?;

    let record = fetched.value;
    let content_disposition = content_disposition(&record.filename);

    let response = (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        record.content,
    );

    Ok(with_session(fetched.minted_session, response))
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
