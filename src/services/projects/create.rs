use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ProjectService, validate};
use crate::errors::HackflowError;
use crate::models::projects::requests::CreateProjectRequest;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_project(
    service: &ProjectService,
    request: &HttpRequest,
    user: &User,
    req: CreateProjectRequest,
) -> ActixResult<HttpResponse> {
    if user.role != UserRole::Participant {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only participants can create projects",
        )));
    }

    if let Err(msg) = validate::validate_create(&req) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            msg,
        )));
    }

    if let Err(response) = service.check_submission_window(request).await {
        return Ok(response);
    }

    let storage = service.get_storage(request);

    // 项目归属队伍，必须先建队或入队
    let team = match storage.get_team_by_member(user.id).await {
        Ok(Some(team)) => team,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::TeamRequired,
                "You must join or create a team before creating a project",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::ProjectCreateFailed)),
    };

    match storage.create_project(team.id, user.id, req).await {
        Ok(project) => {
            info!(
                "User {} created project {} for team {}",
                user.id, project.id, team.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                project,
                "Project created successfully",
            )))
        }
        Err(e @ HackflowError::Conflict(_)) => {
            Ok(error_response(&e, ErrorCode::ProjectAlreadyExists))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectCreateFailed)),
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::HackflowError;
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_team, seed_user};

    fn request(title: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            title: title.to_string(),
            tagline: None,
            description: "team project".to_string(),
            technologies: vec!["rust".to_string()],
            demo_url: None,
            video_url: None,
            github_url: None,
        }
    }

    #[tokio::test]
    async fn test_project_belongs_to_team() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Builders").await;
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();

        // 队员也可以为队伍创建项目，赛道沿用队伍的赛道
        let project = storage
            .create_project(team.id, mate, request("Shared"))
            .await
            .unwrap();
        assert_eq!(project.team_id, team.id);
        assert_eq!(project.created_by, Some(mate));
        assert_eq!(project.category, team.category);

        let err = storage
            .create_project(team.id, leader, request("Another"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::Conflict(_)));

        let found = storage.get_project_by_team(team.id).await.unwrap().unwrap();
        assert_eq!(found.id, project.id);
    }

    #[tokio::test]
    async fn test_unknown_team_is_rejected() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "solo", UserRole::Participant).await;
        let err = storage
            .create_project(404, user, request("Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));
    }
}
