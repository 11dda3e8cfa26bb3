use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeamService, team_size_limit, validate};
use crate::errors::HackflowError;
use crate::models::teams::requests::CreateTeamRequest;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_team(
    service: &TeamService,
    request: &HttpRequest,
    user: &User,
    mut req: CreateTeamRequest,
) -> ActixResult<HttpResponse> {
    if user.role != UserRole::Participant {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only participants can create teams",
        )));
    }

    let storage = service.get_storage(request);

    let size_limit = match team_size_limit(&storage).await {
        Ok(limit) => limit,
        Err(e) => return Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    };
    if let Err(msg) = validate::validate_create(&req, size_limit) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            msg,
        )));
    }
    req.max_members.get_or_insert(size_limit);

    match storage.create_team(user.id, req).await {
        Ok(team) => {
            info!("User {} created team {} ({})", user.id, team.id, team.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                team,
                "Team created successfully",
            )))
        }
        Err(e) => {
            let code = match &e {
                HackflowError::NotFound(_) => ErrorCode::CategoryNotFound,
                HackflowError::Conflict(_) => ErrorCode::TeamNameAlreadyExists,
                HackflowError::InvalidState(_) => ErrorCode::TeamAlreadyJoined,
                _ => ErrorCode::TeamOperationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::HackflowError;
    use crate::models::teams::requests::CreateTeamRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_category, seed_team, seed_user,
    };

    fn request(name: &str, category: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            max_members: Some(3),
            required_skills: vec!["rust".to_string()],
        }
    }

    #[tokio::test]
    async fn test_creator_becomes_leader() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Ferris").await;

        assert_eq!(team.member_count, 1);
        assert!(team.is_leader(leader));
        assert!(team.invite_code.is_some());

        let members = storage.list_team_members(team.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, leader);

        let mine = storage.get_team_by_member(leader).await.unwrap().unwrap();
        assert_eq!(mine.id, team.id);
    }

    #[tokio::test]
    async fn test_one_team_per_user_and_unique_names() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let other = seed_user(&storage, "other", UserRole::Participant).await;
        seed_team(&storage, leader, "Ferris").await;

        let err = storage
            .create_team(leader, request("Second", "web"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        let err = storage
            .create_team(other, request("Ferris", "web"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_category_must_exist_and_accept_teams() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;

        let err = storage
            .create_team(leader, request("Lost", "quantum"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));

        let ai = seed_category(&storage, "ai").await;
        storage
            .update_category(
                ai.id,
                crate::models::categories::requests::UpdateCategoryRequest {
                    max_teams: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = storage
            .create_team(leader, request("Capped", "ai"))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));
        assert!(storage.get_team_by_member(leader).await.unwrap().is_none());
    }
}
