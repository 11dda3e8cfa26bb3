use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{info, warn};

use super::AdminService;
use crate::errors::Result;
use crate::models::admin::responses::RecalculateResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_leaderboard};
use crate::storage::Storage;

/// 从评审记录重建项目得分并报告是否存在偏差
pub(crate) async fn recalculate(
    storage: &Arc<dyn Storage>,
    project_id: i64,
) -> Result<RecalculateResponse> {
    let (previous, current) = storage.recalculate_project_score(project_id).await?;
    let drift_detected = !previous.matches(&current);
    if drift_detected {
        warn!(
            "Score drift repaired for project {}: total {:.4} -> {:.4}, count {} -> {}",
            project_id,
            previous.total_score,
            current.total_score,
            previous.evaluation_count,
            current.evaluation_count
        );
    }
    Ok(RecalculateResponse {
        previous,
        current,
        drift_detected,
    })
}

pub async fn recalculate_project(
    service: &AdminService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match recalculate(&storage, project_id).await {
        Ok(result) => {
            if result.drift_detected {
                invalidate_leaderboard(request).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                result,
                "Project score recalculated",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}

pub async fn finalize_project(
    service: &AdminService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.finalize_project(project_id).await {
        Ok(Some(project)) => {
            info!("Project {} review finalized", project_id);
            invalidate_leaderboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                project,
                "Project review finalized",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotEvaluable)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HackflowError;
    use crate::models::projects::entities::SubmissionStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[tokio::test]
    async fn test_recalculate_without_evaluations() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Quiet").await;

        let result = recalculate(&storage, project.id).await.unwrap();
        assert!(!result.drift_detected);
        assert_eq!(result.current.evaluation_count, 0);
        assert_eq!(result.current.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_recalculate_missing_project() {
        let storage = memory_storage().await;
        let err = recalculate(&storage, 77).await.unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_finalize_requires_under_review() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Final").await;
        assert_eq!(project.submission_status, SubmissionStatus::Submitted);

        let err = storage.finalize_project(project.id).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));
        assert!(storage.finalize_project(999).await.unwrap().is_none());
    }
}
