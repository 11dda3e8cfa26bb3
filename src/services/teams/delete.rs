use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TeamService;
use crate::errors::HackflowError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn delete_team(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    if let Err(response) = service.load_led_team(request, team_id, user_id).await {
        return Ok(response);
    }

    let storage = service.get_storage(request);

    match storage.delete_team(team_id).await {
        Ok(true) => {
            info!("Team {} deleted by leader {}", team_id, user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Team deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => {
            let code = match &e {
                HackflowError::InvalidState(_) => ErrorCode::ProjectAlreadySubmitted,
                _ => ErrorCode::TeamOperationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::HackflowError;
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_team, seed_user,
    };

    #[tokio::test]
    async fn test_draft_team_is_dissolved() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Temporary").await;
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();
        let draft = storage
            .create_project(
                team.id,
                leader,
                CreateProjectRequest {
                    title: "Sketch".to_string(),
                    tagline: None,
                    description: "a draft that never ships".to_string(),
                    technologies: vec![],
                    demo_url: None,
                    video_url: None,
                    github_url: None,
                },
            )
            .await
            .unwrap();

        assert!(storage.delete_team(team.id).await.unwrap());
        assert!(storage.get_team_by_id(team.id).await.unwrap().is_none());
        assert!(storage.get_project_by_id(draft.id).await.unwrap().is_none());
        assert!(storage.get_team_by_member(mate).await.unwrap().is_none());

        // 解散后可以重新建队
        seed_team(&storage, mate, "Reborn").await;
    }

    #[tokio::test]
    async fn test_submitted_team_is_kept() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, leader, "Shipped").await;

        let err = storage.delete_team(project.team_id).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));
        assert!(storage.get_team_by_id(project.team_id).await.unwrap().is_some());
    }
}
