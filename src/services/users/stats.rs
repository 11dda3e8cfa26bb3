use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::UserService;
use crate::errors::Result;
use crate::models::users::responses::{TeamSummary, UserStatsResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

pub(crate) async fn collect_stats(
    storage: &Arc<dyn Storage>,
    user_id: i64,
) -> Result<UserStatsResponse> {
    let team = storage.get_team_by_member(user_id).await?;
    let project = match &team {
        Some(team) => storage.get_project_by_team(team.id).await?,
        None => None,
    };

    Ok(UserStatsResponse {
        is_team_leader: team.as_ref().is_some_and(|t| t.is_leader(user_id)),
        team_member_count: team.as_ref().map_or(0, |t| t.member_count),
        team: team.as_ref().map(TeamSummary::from),
        project,
        evaluations_submitted: storage.count_evaluations_by_judge(user_id).await?,
        unread_notifications: storage.get_unread_notification_count(user_id).await? as u64,
    })
}

pub async fn get_stats(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match collect_stats(&storage, user_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "User stats retrieved successfully",
        ))),
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
    async fn test_stats_follow_team_membership() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let loner = seed_user(&storage, "loner", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, leader, "Stats").await;
        let team = storage.get_team_by_id(project.team_id).await.unwrap().unwrap();
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();

        let lead_stats = collect_stats(&storage, leader).await.unwrap();
        assert!(lead_stats.is_team_leader);
        assert_eq!(lead_stats.team_member_count, 2);
        assert_eq!(lead_stats.project.map(|p| p.id), Some(project.id));

        let mate_stats = collect_stats(&storage, mate).await.unwrap();
        assert!(!mate_stats.is_team_leader);
        assert_eq!(mate_stats.team.map(|t| t.id), Some(team.id));

        let loner_stats = collect_stats(&storage, loner).await.unwrap();
        assert!(loner_stats.team.is_none());
        assert!(loner_stats.project.is_none());
        assert_eq!(loner_stats.evaluations_submitted, 0);
    }
}
