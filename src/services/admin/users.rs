use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AdminService;
use crate::middlewares::require_jwt::invalidate_cached_user;
use crate::models::admin::requests::{UpdateUserRoleRequest, UpdateUserStatusRequest};
use crate::models::users::requests::{UpdateUserRequest, UserListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::get_cache;

pub async fn list_users(
    service: &AdminService,
    request: &HttpRequest,
    query: UserListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_users_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Users retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list users: {e}"),
            )),
        ),
    }
}

async fn apply_update(
    service: &AdminService,
    request: &HttpRequest,
    user_id: i64,
    update: UpdateUserRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.update_user(user_id, update).await {
        Ok(Some(user)) => {
            // 令牌仍有效的会话需要重新加载角色与状态
            if let Some(cache) = get_cache(request) {
                invalidate_cached_user(&cache, user_id).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "User updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserUpdateFailed,
                format!("Failed to update user: {e}"),
            )),
        ),
    }
}

pub async fn update_user_role(
    service: &AdminService,
    request: &HttpRequest,
    operator_id: i64,
    user_id: i64,
    req: UpdateUserRoleRequest,
) -> ActixResult<HttpResponse> {
    // 不能修改自己的角色，避免系统失去管理员
    if operator_id == user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserRoleInvalid,
            "You cannot change your own role",
        )));
    }

    info!(
        "Admin {} changing role of user {} to {}",
        operator_id, user_id, req.role
    );
    apply_update(
        service,
        request,
        user_id,
        UpdateUserRequest {
            role: Some(req.role),
            ..Default::default()
        },
    )
    .await
}

pub async fn update_user_status(
    service: &AdminService,
    request: &HttpRequest,
    operator_id: i64,
    user_id: i64,
    req: UpdateUserStatusRequest,
) -> ActixResult<HttpResponse> {
    if operator_id == user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            "You cannot change your own status",
        )));
    }

    info!(
        "Admin {} changing status of user {} to {}",
        operator_id, user_id, req.status
    );
    apply_update(
        service,
        request,
        user_id,
        UpdateUserRequest {
            status: Some(req.status),
            ..Default::default()
        },
    )
    .await
}
