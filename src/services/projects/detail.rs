use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::ProjectService;
use crate::errors::Result;
use crate::models::projects::entities::Project;
use crate::models::projects::responses::ProjectDetailResponse;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

/// 组装项目详情：评审明细仅对队员、评委和管理员可见
pub(crate) async fn build_detail(
    storage: &Arc<dyn Storage>,
    viewer: &User,
    project: Project,
) -> Result<ProjectDetailResponse> {
    let files = storage.list_project_files(project.id).await?;
    let is_member = storage
        .get_team_by_member(viewer.id)
        .await?
        .is_some_and(|team| team.id == project.team_id);
    let evaluations = if is_member || viewer.role.can_view_evaluations() {
        Some(storage.list_evaluations_by_project(project.id).await?)
    } else {
        None
    };

    Ok(ProjectDetailResponse {
        project,
        files,
        evaluations,
    })
}

async fn respond(
    storage: &Arc<dyn Storage>,
    viewer: &User,
    project: Option<Project>,
) -> ActixResult<HttpResponse> {
    let Some(project) = project else {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        )));
    };

    match build_detail(storage, viewer, project).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Project retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load project: {e}"),
            )),
        ),
    }
}

pub async fn get_project(
    service: &ProjectService,
    request: &HttpRequest,
    user: &User,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_project_by_id(project_id).await {
        Ok(project) => respond(&storage, user, project).await,
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load project: {e}"),
            )),
        ),
    }
}

pub async fn get_my_project(
    service: &ProjectService,
    request: &HttpRequest,
    user: &User,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let team = match storage.get_team_by_member(user.id).await {
        Ok(Some(team)) => team,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TeamNotFound,
                "You are not in a team",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    match storage.get_project_by_team(team.id).await {
        Ok(project) => respond(&storage, user, project).await,
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load project: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::models::evaluations::requests::{CriterionInput, ScoresInput};
    use crate::models::users::entities::UserRole;
    use crate::services::evaluations::{scoring::EvaluationPatch, workflow};
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[tokio::test]
    async fn test_evaluations_hidden_from_other_participants() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let rival = seed_user(&storage, "rival", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Visible").await;

        let input = Some(CriterionInput {
            score: Some(5.0),
            weight: None,
        });
        let patch = EvaluationPatch::parse(
            &ScoresInput {
                innovation: input,
                technical: input,
                implementation: input,
                impact: input,
            },
            None,
            None,
        )
        .unwrap();
        workflow::submit_evaluation(&storage, &ScoringConfig::default(), judge, project.id, patch)
            .await
            .unwrap();

        let owner_view = build_detail(&storage, &storage_user(&storage, owner).await, project.clone())
            .await
            .unwrap();
        assert_eq!(owner_view.evaluations.map(|e| e.len()), Some(1));

        let judge_view = build_detail(&storage, &storage_user(&storage, judge).await, project.clone())
            .await
            .unwrap();
        assert!(judge_view.evaluations.is_some());

        let rival_view = build_detail(&storage, &storage_user(&storage, rival).await, project.clone())
            .await
            .unwrap();
        assert!(rival_view.evaluations.is_none());

        // 通过邀请码入队的队员同样可见
        let team = storage.get_team_by_id(project.team_id).await.unwrap().unwrap();
        let code = team.invite_code.unwrap();
        storage.join_team(rival, &code).await.unwrap();
        let teammate_view = build_detail(&storage, &storage_user(&storage, rival).await, project)
            .await
            .unwrap();
        assert_eq!(teammate_view.evaluations.map(|e| e.len()), Some(1));
    }

    async fn storage_user(storage: &Arc<dyn Storage>, id: i64) -> User {
        storage.get_user_by_id(id).await.unwrap().unwrap()
    }
}
