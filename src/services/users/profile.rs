use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::users::requests::UserSearchQuery;
use crate::models::users::responses::PublicProfileResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub const DEFAULT_SEARCH_LIMIT: u64 = 10;
pub const MAX_SEARCH_LIMIT: u64 = 50;
const SEARCH_MIN_CHARS: usize = 2;

pub async fn get_profile(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    match storage.get_team_by_member(user_id).await {
        Ok(team) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PublicProfileResponse::new(user, team.as_ref()),
            "Profile retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn search_users(
    service: &UserService,
    request: &HttpRequest,
    query: UserSearchQuery,
) -> ActixResult<HttpResponse> {
    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    if keyword.chars().count() < SEARCH_MIN_CHARS {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            format!("Search query must be at least {SEARCH_MIN_CHARS} characters"),
        )));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let storage = service.get_storage(request);

    match storage.search_users(keyword, limit).await {
        Ok(users) => {
            let results: Vec<PublicProfileResponse> = users
                .into_iter()
                .map(|user| PublicProfileResponse::new(user, None))
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                results,
                "Users retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::{UserRole, UserStatus};
    use crate::models::users::requests::UpdateUserRequest;
    use crate::storage::sea_orm_storage::testing::{memory_storage, seed_user};

    #[tokio::test]
    async fn test_search_skips_inactive_users() {
        let storage = memory_storage().await;
        seed_user(&storage, "rustacean", UserRole::Participant).await;
        seed_user(&storage, "rusty_judge", UserRole::Judge).await;
        let banned = seed_user(&storage, "rust_banned", UserRole::Participant).await;
        seed_user(&storage, "gopher", UserRole::Participant).await;

        storage
            .update_user(
                banned,
                UpdateUserRequest {
                    status: Some(UserStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = storage.search_users("rust", 10).await.unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["rustacean", "rusty_judge"]);

        let limited = storage.search_users("rust", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
