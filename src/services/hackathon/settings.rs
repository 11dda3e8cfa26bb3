use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::HackathonService;
use crate::models::hackathon::requests::UpdateHackathonRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_leaderboard};

pub async fn get_settings(
    service: &HackathonService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .get_or_create_hackathon_settings(service.get_default_weights())
        .await
    {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            settings,
            "Hackathon settings retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_settings(
    service: &HackathonService,
    request: &HttpRequest,
    user_id: i64,
    req: UpdateHackathonRequest,
) -> ActixResult<HttpResponse> {
    // 校验错误与日期解析错误均为 400
    let patch = match req.into_patch() {
        Ok(patch) => patch,
        Err(e) => return Ok(error_response(&e, ErrorCode::ValidationFailed)),
    };
    let toggles_leaderboard = patch.enable_leaderboard.is_some();

    let storage = service.get_storage(request);

    match storage
        .update_hackathon_settings(patch, service.get_default_weights(), user_id)
        .await
    {
        Ok(settings) => {
            info!("Hackathon settings updated by admin {}", user_id);
            if toggles_leaderboard {
                invalidate_leaderboard(request).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                settings,
                "Hackathon settings updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CriterionWeights;
    use crate::models::hackathon::requests::UpdateHackathonRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_user};

    #[tokio::test]
    async fn test_seeded_settings_and_partial_update() {
        let storage = memory_storage().await;
        let admin = seed_user(&storage, "admin", UserRole::Admin).await;
        let defaults = CriterionWeights::default();

        // 迁移写入的默认配置
        let seeded = storage.get_hackathon_settings().await.unwrap().unwrap();
        assert_eq!(seeded.name, "HackFlow");
        assert_eq!(seeded.max_team_size, 4);
        assert!(seeded.enable_leaderboard);
        assert!(seeded.submission_deadline.is_none());

        let patch = UpdateHackathonRequest {
            tagline: Some("Build something wild".to_string()),
            submission_deadline: Some("2025-03-03T23:59:59Z".to_string()),
            max_team_size: Some(5),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        let updated = storage
            .update_hackathon_settings(patch, &defaults, admin)
            .await
            .unwrap();

        assert_eq!(updated.name, "HackFlow");
        assert_eq!(updated.tagline.as_deref(), Some("Build something wild"));
        assert_eq!(updated.max_team_size, 5);
        assert_eq!(
            updated.submission_deadline.map(|d| d.timestamp()),
            Some(1_741_046_399)
        );
        assert_eq!(updated.updated_by, Some(admin));
        assert!(!updated.accepts_submissions(chrono::Utc::now()));
    }
}
