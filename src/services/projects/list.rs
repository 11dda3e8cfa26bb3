use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProjectService;
use crate::models::projects::entities::SubmissionStatus;
use crate::models::projects::requests::ProjectListQuery;
use crate::models::{ApiResponse, ErrorCode};

/// 公开列表不包含草稿
fn public_query(mut query: ProjectListQuery) -> ProjectListQuery {
    query
        .statuses
        .retain(|status| *status != SubmissionStatus::Draft);
    if query.statuses.is_empty() {
        query.statuses = SubmissionStatus::judged().to_vec();
    }
    query
}

pub async fn list_projects(
    service: &ProjectService,
    request: &HttpRequest,
    query: ProjectListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_projects_with_pagination(public_query(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Projects retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list projects: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafts_are_never_listed() {
        let query = public_query(ProjectListQuery::default());
        assert_eq!(query.statuses, SubmissionStatus::judged().to_vec());

        let query = public_query(ProjectListQuery {
            statuses: vec![SubmissionStatus::Draft],
            ..Default::default()
        });
        assert!(!query.statuses.contains(&SubmissionStatus::Draft));

        let query = public_query(ProjectListQuery {
            statuses: vec![SubmissionStatus::Reviewed],
            ..Default::default()
        });
        assert_eq!(query.statuses, vec![SubmissionStatus::Reviewed]);
    }
}
