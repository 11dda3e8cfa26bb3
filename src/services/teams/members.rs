use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TeamService;
use crate::errors::HackflowError;
use crate::models::teams::requests::JoinTeamRequest;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn join_team(
    service: &TeamService,
    request: &HttpRequest,
    user: &User,
    req: JoinTeamRequest,
) -> ActixResult<HttpResponse> {
    if user.role != UserRole::Participant {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only participants can join teams",
        )));
    }
    if req.invite_code.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Invite code is required",
        )));
    }

    let storage = service.get_storage(request);

    match storage.get_team_by_member(user.id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::TeamAlreadyJoined,
                "You are already in a team. Leave your current team first.",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    }

    match storage.join_team(user.id, &req.invite_code).await {
        Ok(team) => {
            info!("User {} joined team {}", user.id, team.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                team,
                "Joined team successfully",
            )))
        }
        Err(e) => {
            let code = match &e {
                HackflowError::NotFound(_) => ErrorCode::TeamInviteInvalid,
                HackflowError::InvalidState(_) => ErrorCode::TeamFull,
                _ => ErrorCode::TeamOperationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}

pub async fn leave_team(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_team_by_id(team_id).await {
        Ok(Some(team)) if team.is_leader(user_id) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::TeamLeaderCannotLeave,
                "Team leader cannot leave. Delete the team instead.",
            )));
        }
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TeamNotFound,
                "Team not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    }

    match storage.remove_team_member(team_id, user_id).await {
        Ok(()) => {
            info!("User {} left team {}", user_id, team_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Left team successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    }
}

pub async fn remove_member(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
    team_id: i64,
    member_id: i64,
) -> ActixResult<HttpResponse> {
    if let Err(response) = service.load_led_team(request, team_id, user_id).await {
        return Ok(response);
    }
    if member_id == user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::TeamLeaderCannotLeave,
            "Team leader cannot be removed",
        )));
    }

    let storage = service.get_storage(request);

    match storage.remove_team_member(team_id, member_id).await {
        Ok(()) => {
            info!(
                "Leader {} removed user {} from team {}",
                user_id, member_id, team_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Member removed successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::HackflowError;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_team, seed_user};

    #[tokio::test]
    async fn test_join_leave_and_remove() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Pair").await;
        let code = team.invite_code.clone().unwrap();

        // 邀请码大小写不敏感
        let joined = storage
            .join_team(mate, &code.to_lowercase())
            .await
            .unwrap();
        assert_eq!(joined.member_count, 2);

        let members = storage.list_team_members(team.id).await.unwrap();
        assert_eq!(members[0].user_id, leader);
        assert_eq!(members[1].user_id, mate);

        let err = storage.join_team(mate, &code).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        let err = storage
            .remove_team_member(team.id, leader)
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        storage.remove_team_member(team.id, mate).await.unwrap();
        assert!(storage.get_team_by_member(mate).await.unwrap().is_none());

        let err = storage.remove_team_member(team.id, mate).await.unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_full_team_and_bad_code() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Crowded").await;
        let code = team.invite_code.clone().unwrap();

        for idx in 0..(team.max_members - 1) {
            let user = seed_user(&storage, &format!("mate_{idx}"), UserRole::Participant).await;
            storage.join_team(user, &code).await.unwrap();
        }

        let late = seed_user(&storage, "late", UserRole::Participant).await;
        let err = storage.join_team(late, &code).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        let err = storage.join_team(late, "NOPE00").await.unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));

        let full = storage.get_team_by_id(team.id).await.unwrap().unwrap();
        assert!(full.is_full());
    }
}
