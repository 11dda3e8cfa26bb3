use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::projects::requests::ProjectListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

/// 管理端项目列表，包含草稿
pub async fn list_submissions(
    service: &AdminService,
    request: &HttpRequest,
    query: ProjectListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_projects_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::projects::entities::SubmissionStatus;
    use crate::models::projects::requests::{CreateProjectRequest, ProjectListQuery};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_team, seed_user,
    };

    #[tokio::test]
    async fn test_drafts_visible_to_admin_listing() {
        let storage = memory_storage().await;
        let a = seed_user(&storage, "a", UserRole::Participant).await;
        let b = seed_user(&storage, "b", UserRole::Participant).await;
        seed_submitted_project(&storage, a, "Shipped").await;
        let team = seed_team(&storage, b, "Late team").await;
        storage
            .create_project(
                team.id,
                b,
                CreateProjectRequest {
                    title: "Unfinished".to_string(),
                    tagline: None,
                    description: "still hacking".to_string(),
                    technologies: vec![],
                    demo_url: None,
                    video_url: None,
                    github_url: None,
                },
            )
            .await
            .unwrap();

        let all = storage
            .list_projects_with_pagination(ProjectListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 2);

        let drafts = storage
            .list_projects_with_pagination(ProjectListQuery {
                statuses: vec![SubmissionStatus::Draft],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(drafts.items.len(), 1);
        assert_eq!(drafts.items[0].title, "Unfinished");
        assert_eq!(drafts.items[0].category, "web");
    }
}
