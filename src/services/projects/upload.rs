use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs;
use std::io::Write;
use std::{fs::File, path::Path};
use uuid::Uuid;

use super::ProjectService;
use crate::config::AppConfig;
use crate::errors::HackflowError;
use crate::models::files::{entities::NewProjectFile, responses::FileUploadResponse};
use crate::models::projects::entities::SubmissionStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate_magic_bytes;

/// 规范化扩展名，形如 ".pdf"
fn normalized_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

pub async fn upload_file(
    service: &ProjectService,
    req: &HttpRequest,
    user_id: i64,
    project_id: i64,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let project = match service.load_owned_project(req, project_id, user_id).await {
        Ok(project) => project,
        Err(response) => return Ok(response),
    };
    if project.submission_status != SubmissionStatus::Draft {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotEditable,
            "Files can only be attached to draft projects",
        )));
    }

    let config = AppConfig::get();
    let upload_dir = &config.upload.dir;
    let max_size = config.upload.max_size;
    let allowed_types = &config.upload.allowed_types;

    // 确保上传目录存在
    if !Path::new(upload_dir).exists()
        && let Err(e) = fs::create_dir_all(upload_dir)
    {
        tracing::error!("{}", HackflowError::file_operation(format!("{e}")));
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::FileUploadFailed,
                "Failed to create upload directory",
            )),
        );
    }

    let mut original_name = String::new();
    let mut file_size: i64 = 0;
    let mut file_uploaded = false;
    let mut file_type = String::new();
    let mut stored_name = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != "file" {
            continue;
        }
        if file_uploaded {
            if !stored_name.is_empty() {
                let _ = fs::remove_file(format!("{upload_dir}/{stored_name}"));
            }
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            )));
        }
        file_uploaded = true;

        original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let extension = normalized_extension(&original_name);
        if !allowed_types.iter().any(|t| t.to_lowercase() == extension) {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            )));
        }

        // MIME 类型仅用于记录
        file_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();

        stored_name = format!("{}-{}.bin", chrono::Utc::now().timestamp(), Uuid::new_v4());
        let file_path = format!("{upload_dir}/{stored_name}");
        let mut f = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("{}", HackflowError::file_operation(format!("{e}")));
                return Ok(HttpResponse::InternalServerError().json(
                    ApiResponse::<()>::error_empty(
                        ErrorCode::FileUploadFailed,
                        "Failed to create file",
                    ),
                ));
            }
        };

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    let _ = fs::remove_file(&file_path);
                    return Err(e.into());
                }
            };

            // 首个分块校验魔术字节
            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    let _ = fs::remove_file(&file_path);
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::FileTypeNotAllowed,
                        "File content does not match its extension",
                    )));
                }
            }

            total_size += data.len();
            if total_size > max_size {
                let _ = fs::remove_file(&file_path);
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                )));
            }
            f.write_all(&data)?;
        }
        file_size = total_size as i64;
    }

    if !file_uploaded {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        )));
    }

    let storage = service.get_storage(req);

    match storage
        .create_project_file(NewProjectFile {
            project_id,
            original_name,
            stored_name: stored_name.clone(),
            file_size,
            file_type,
            uploaded_by: user_id,
        })
        .await
    {
        Ok(file) => Ok(HttpResponse::Created().json(ApiResponse::success(
            FileUploadResponse {
                id: file.id,
                project_id: file.project_id,
                file_name: file.original_name,
                size: file.file_size,
                content_type: file.file_type,
                uploaded_at: file.created_at,
            },
            "File uploaded successfully",
        ))),
        Err(e) => {
            let _ = fs::remove_file(format!("{upload_dir}/{stored_name}"));
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::FileUploadFailed,
                    format!("Failed to upload file: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_extension() {
        assert_eq!(normalized_extension("deck.PDF"), ".pdf");
        assert_eq!(normalized_extension("archive.tar.gz"), ".gz");
        assert_eq!(normalized_extension("README"), "");
    }
}
