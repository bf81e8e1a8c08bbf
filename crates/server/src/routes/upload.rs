use std::path::Path;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::state::AppState;

/// Request body cap for `/api/upload`.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

const FILE_FIELD: &str = "file";

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    success: bool,
    filename: String,
    url: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadFailure {
    error: String,
}

fn failure(status: StatusCode, error: &str) -> Response {
    let body = Json(UploadFailure {
        error: error.to_string(),
    });
    (status, body).into_response()
}

/// Strips any directory components a client put in the file name.
fn basename(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file in the form", body = UploadFailure),
        (status = 500, description = "File could not be stored", body = UploadFailure)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!(error = %rejection, "Upload is not a multipart form");
            return failure(StatusCode::BAD_REQUEST, "No file uploaded");
        }
    };

    let (name, bytes) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return failure(StatusCode::BAD_REQUEST, "No file uploaded"),
            Err(e) => {
                error!(error = %e, "Upload error");
                return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload file");
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().and_then(basename).map(str::to_string) else {
            return failure(StatusCode::BAD_REQUEST, "No file uploaded");
        };

        match field.bytes().await {
            Ok(bytes) => break (name, bytes),
            Err(e) => {
                error!(error = %e, "Upload error");
                return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload file");
            }
        }
    };

    let filename = format!("{}-{}", Utc::now().timestamp_millis(), name);
    let dir = &state.config.uploads_dir;
    let written = async {
        fs::create_dir_all(dir).await?;
        fs::write(dir.join(&filename), &bytes).await
    }
    .await;

    if let Err(e) = written {
        error!(error = %e, dir = %dir.display(), "Upload error");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload file");
    }

    info!(filename = %filename, bytes = bytes.len(), "File uploaded");
    Json(UploadResponse {
        success: true,
        url: format!("{}/{}", UPLOADS_ROUTE, filename),
        filename,
    })
    .into_response()
}
