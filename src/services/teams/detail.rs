use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::TeamService;
use crate::errors::Result;
use crate::models::teams::entities::Team;
use crate::models::teams::requests::TeamListQuery;
use crate::models::teams::responses::TeamDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

/// 组装队伍详情：邀请码只对队员可见
pub(crate) async fn build_detail(
    storage: &Arc<dyn Storage>,
    viewer_id: i64,
    team: Team,
) -> Result<TeamDetailResponse> {
    let members = storage.list_team_members(team.id).await?;
    let project = storage.get_project_by_team(team.id).await?;
    let is_member = members.iter().any(|m| m.user_id == viewer_id);

    Ok(TeamDetailResponse {
        team: if is_member {
            team
        } else {
            team.without_invite_code()
        },
        members,
        project,
    })
}

pub async fn list_teams(
    service: &TeamService,
    request: &HttpRequest,
    query: TeamListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_teams(query).await {
        Ok(teams) => {
            let teams: Vec<Team> = teams.into_iter().map(Team::without_invite_code).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                teams,
                "Teams retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

async fn respond(
    storage: &Arc<dyn Storage>,
    viewer_id: i64,
    team: Option<Team>,
    missing: &str,
) -> ActixResult<HttpResponse> {
    let Some(team) = team else {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TeamNotFound,
            missing,
        )));
    };

    match build_detail(storage, viewer_id, team).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Team retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_team(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_team_by_id(team_id).await {
        Ok(team) => respond(&storage, user_id, team, "Team not found").await,
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn get_my_team(
    service: &TeamService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_team_by_member(user_id).await {
        Ok(team) => respond(&storage, user_id, team, "You are not in a team").await,
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[tokio::test]
    async fn test_invite_code_visible_to_members_only() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let outsider = seed_user(&storage, "outsider", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, leader, "Orbit").await;
        let team = storage.get_team_by_id(project.team_id).await.unwrap().unwrap();

        let own = build_detail(&storage, leader, team.clone()).await.unwrap();
        assert!(own.team.invite_code.is_some());
        assert_eq!(own.members.len(), 1);
        assert_eq!(own.project.map(|p| p.id), Some(project.id));

        let public = build_detail(&storage, outsider, team).await.unwrap();
        assert!(public.team.invite_code.is_none());
        assert_eq!(public.members.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let storage = memory_storage().await;
        let a = seed_user(&storage, "a", UserRole::Participant).await;
        let b = seed_user(&storage, "b", UserRole::Participant).await;
        let first = crate::storage::sea_orm_storage::testing::seed_team(&storage, a, "Alpha").await;
        crate::storage::sea_orm_storage::testing::seed_team(&storage, b, "Beta").await;

        storage
            .update_team(
                first.id,
                crate::models::teams::requests::UpdateTeamRequest {
                    looking_for_members: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = storage.list_teams(TeamListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|t| t.member_count == 1));

        let open = storage
            .list_teams(TeamListQuery {
                category: Some("web".to_string()),
                looking_for_members: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].name, "Beta");
    }
}
