use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::projects::entities::SubmissionStatus;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_leaderboard};

pub async fn delete_project(
    service: &ProjectService,
    request: &HttpRequest,
    user: &User,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let project = match storage.get_project_by_id(project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ProjectNotFound,
                "Project not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load project: {e}"),
                )),
            );
        }
    };

    // 管理员可随时删除；队长只能删除草稿
    let is_admin = user.role == UserRole::Admin;
    if !is_admin {
        let is_leader = match storage.get_team_by_id(project.team_id).await {
            Ok(team) => team.is_some_and(|t| t.is_leader(user.id)),
            Err(e) => return Ok(error_response(&e, ErrorCode::ProjectDeleteFailed)),
        };
        if !is_leader {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::TeamLeaderRequired,
                "Only the team leader can delete this project",
            )));
        }
        if project.submission_status != SubmissionStatus::Draft {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ProjectNotEditable,
                "Submitted projects can only be deleted by an administrator",
            )));
        }
    }

    match storage.delete_project(project_id).await {
        Ok(true) => {
            info!("Project {} deleted by user {}", project_id, user.id);
            invalidate_leaderboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Project deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ProjectDeleteFailed,
                format!("Failed to delete project: {e}"),
            )),
        ),
    }
}
