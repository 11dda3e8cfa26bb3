use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::errors::HackflowError;
use crate::middlewares::require_jwt::invalidate_cached_user;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, get_cache};

pub async fn delete_account(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_user(user_id).await {
        Ok(true) => {
            // 已签发的令牌不再能加载到用户
            if let Some(cache) = get_cache(request) {
                invalidate_cached_user(&cache, user_id).await;
            }
            info!("User {} deleted their account", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Account deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e @ HackflowError::InvalidState(_)) => {
            Ok(error_response(&e, ErrorCode::UserUpdateFailed))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScoringConfig;
    use crate::errors::HackflowError;
    use crate::models::evaluations::requests::{CriterionInput, ScoresInput};
    use crate::models::users::entities::UserRole;
    use crate::services::evaluations::{scoring::EvaluationPatch, workflow};
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[tokio::test]
    async fn test_member_account_is_removed() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, leader, "Leaving").await;
        let team = storage.get_team_by_id(project.team_id).await.unwrap().unwrap();
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();

        assert!(storage.delete_user(mate).await.unwrap());
        assert!(storage.get_user_by_id(mate).await.unwrap().is_none());
        let team = storage.get_team_by_id(team.id).await.unwrap().unwrap();
        assert_eq!(team.member_count, 1);

        assert!(!storage.delete_user(mate).await.unwrap());
    }

    #[tokio::test]
    async fn test_leaders_and_active_judges_are_kept() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, leader, "Anchored").await;

        let err = storage.delete_user(leader).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        let input = Some(CriterionInput {
            score: Some(6.0),
            weight: None,
        });
        let patch = EvaluationPatch::parse(
            &ScoresInput {
                innovation: input,
                technical: input,
                implementation: input,
                impact: input,
            },
            None,
            None,
        )
        .unwrap();
        workflow::submit_evaluation(&storage, &ScoringConfig::default(), judge, project.id, patch)
            .await
            .unwrap();

        // 评审仍计入项目得分
        let err = storage.delete_user(judge).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));
        let score = storage.compute_project_score(project.id).await.unwrap();
        assert_eq!(score.evaluation_count, 1);
    }
}
