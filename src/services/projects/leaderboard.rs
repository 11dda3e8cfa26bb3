use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::ProjectService;
use crate::cache::{CacheResult, ObjectCache, ObjectCacheExt};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::projects::requests::LeaderboardQuery;
use crate::models::projects::responses::LeaderboardResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{LEADERBOARD_CACHE_KEY, error_response, get_cache};
use crate::storage::Storage;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// 读取排行榜前 `MAX_LIMIT` 名，优先使用缓存
pub(crate) async fn load_leaderboard(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
    ttl: u64,
) -> Result<LeaderboardResponse> {
    if let Some(cache) = cache
        && let CacheResult::Found(board) = cache
            .get_json::<LeaderboardResponse>(LEADERBOARD_CACHE_KEY)
            .await
    {
        return Ok(board);
    }

    let board = LeaderboardResponse {
        items: storage.list_leaderboard(MAX_LIMIT).await?,
        generated_at: chrono::Utc::now(),
    };

    if let Some(cache) = cache {
        cache
            .insert_json(LEADERBOARD_CACHE_KEY.to_string(), &board, ttl)
            .await;
    }
    Ok(board)
}

pub async fn get_leaderboard(
    service: &ProjectService,
    request: &HttpRequest,
    query: LeaderboardQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 管理员可关闭公开排行榜
    match storage.get_hackathon_settings().await {
        Ok(Some(settings)) if !settings.enable_leaderboard => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "The leaderboard is currently disabled",
            )));
        }
        Ok(_) => {}
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    }

    let cache = get_cache(request);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;

    match load_leaderboard(&storage, cache.as_ref(), AppConfig::get().scoring.leaderboard_ttl).await
    {
        Ok(mut board) => {
            board.items.truncate(limit);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                board,
                "Leaderboard retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load leaderboard: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::config::ScoringConfig;
    use crate::models::evaluations::requests::{CriterionInput, ScoresInput};
    use crate::models::users::entities::UserRole;
    use crate::services::evaluations::{scoring::EvaluationPatch, workflow};
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    fn uniform(score: f64) -> EvaluationPatch {
        let input = Some(CriterionInput {
            score: Some(score),
            weight: None,
        });
        EvaluationPatch::parse(
            &ScoresInput {
                innovation: input,
                technical: input,
                implementation: input,
                impact: input,
            },
            None,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_by_average() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;

        let mut ids = Vec::new();
        for (idx, score) in [6.0, 9.0, 7.5].into_iter().enumerate() {
            let owner = seed_user(&storage, &format!("owner_{idx}"), UserRole::Participant).await;
            let project = seed_submitted_project(&storage, owner, &format!("Entry {idx}")).await;
            workflow::submit_evaluation(&storage, &scoring, judge, project.id, uniform(score))
                .await
                .unwrap();
            ids.push(project.id);
        }
        // 未评审的项目不上榜
        let idle = seed_user(&storage, "idle_owner", UserRole::Participant).await;
        seed_submitted_project(&storage, idle, "Idle").await;

        let board = load_leaderboard(&storage, None, 60).await.unwrap();
        let ranked: Vec<i64> = board.items.iter().map(|e| e.project_id).collect();
        assert_eq!(ranked, vec![ids[1], ids[2], ids[0]]);
        assert_eq!(board.items[0].rank, 1);
        assert_eq!(board.items[0].team_name, "Entry 1 team");
        assert_eq!(board.items[2].rank, 3);
    }

    #[tokio::test]
    async fn test_leaderboard_served_from_cache() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Cached").await;

        let empty = load_leaderboard(&storage, Some(&cache), 60).await.unwrap();
        assert!(empty.items.is_empty());

        workflow::submit_evaluation(&storage, &scoring, judge, project.id, uniform(8.0))
            .await
            .unwrap();

        // 缓存未失效前仍返回旧结果
        let stale = load_leaderboard(&storage, Some(&cache), 60).await.unwrap();
        assert!(stale.items.is_empty());

        cache.remove(LEADERBOARD_CACHE_KEY).await;
        let fresh = load_leaderboard(&storage, Some(&cache), 60).await.unwrap();
        assert_eq!(fresh.items.len(), 1);
        assert_eq!(fresh.items[0].project_id, project.id);
    }
}
