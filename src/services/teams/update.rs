use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TeamService, team_size_limit, validate};
use crate::errors::HackflowError;
use crate::models::teams::requests::UpdateTeamRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn update_team(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
    team_id: i64,
    req: UpdateTeamRequest,
) -> ActixResult<HttpResponse> {
    if let Err(response) = service.load_led_team(request, team_id, user_id).await {
        return Ok(response);
    }

    let storage = service.get_storage(request);

    let size_limit = match team_size_limit(&storage).await {
        Ok(limit) => limit,
        Err(e) => return Ok(error_response(&e, ErrorCode::TeamOperationFailed)),
    };
    if let Err(msg) = validate::validate_update(&req, size_limit) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            msg,
        )));
    }

    match storage.update_team(team_id, req).await {
        Ok(Some(team)) => {
            info!("Team {} updated by leader {}", team_id, user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                team,
                "Team updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            "Team not found",
        ))),
        Err(e) => {
            let code = match &e {
                HackflowError::Conflict(_) => ErrorCode::TeamNameAlreadyExists,
                _ => ErrorCode::TeamOperationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::HackflowError;
    use crate::models::teams::requests::UpdateTeamRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_team, seed_user};

    #[tokio::test]
    async fn test_max_members_not_below_current_size() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let team = seed_team(&storage, leader, "Shrinking").await;
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();

        let err = storage
            .update_team(
                team.id,
                UpdateTeamRequest {
                    max_members: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));

        let updated = storage
            .update_team(
                team.id,
                UpdateTeamRequest {
                    name: Some("Renamed".to_string()),
                    max_members: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.member_count, 2);
        assert!(updated.is_full());
    }
}
