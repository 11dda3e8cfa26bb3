use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::AdminService;
use crate::errors::Result;
use crate::models::admin::responses::DashboardStats;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub(crate) async fn collect_dashboard(storage: &Arc<dyn Storage>) -> Result<DashboardStats> {
    Ok(DashboardStats {
        total_users: storage.count_users().await?,
        users_by_role: storage.count_users_by_role().await?,
        total_teams: storage.count_teams().await?,
        projects_by_status: storage.count_projects_by_status().await?,
        total_evaluations: storage.count_evaluations(false).await?,
        complete_evaluations: storage.count_evaluations(true).await?,
    })
}

pub async fn get_dashboard(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match collect_dashboard(&storage).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Dashboard retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to collect dashboard: {e}"),
            )),
        ),
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
    async fn test_dashboard_counts() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        seed_user(&storage, "judge1", UserRole::Judge).await;
        seed_user(&storage, "judge2", UserRole::Judge).await;
        seed_submitted_project(&storage, owner, "Counted").await;

        let stats = collect_dashboard(&storage).await.unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_teams, 1);
        assert_eq!(stats.total_evaluations, 0);

        let judges = stats
            .users_by_role
            .iter()
            .find(|c| c.label == "judge")
            .map(|c| c.count);
        assert_eq!(judges, Some(2));

        let submitted = stats
            .projects_by_status
            .iter()
            .find(|c| c.label == "submitted")
            .map(|c| c.count);
        assert_eq!(submitted, Some(1));
    }
}
