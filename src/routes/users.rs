use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::missing_user;
use crate::middlewares::{self, RequireJWT};
use crate::models::users::requests::UserSearchQuery;
use crate::services::UserService;
use crate::utils::SafeIDI64;

static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn get_profile(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_profile(&req, path.0).await
}

pub async fn search_users(
    req: HttpRequest,
    query: web::Query<UserSearchQuery>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.search_users(&req, query.into_inner()).await
}

pub async fn get_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    USER_SERVICE.get_stats(&req, user_id).await
}

pub async fn delete_account(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    USER_SERVICE.delete_account(&req, user_id).await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .route("/{id}/profile", web::get().to(get_profile))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/search", web::get().to(search_users))
                    .route("/stats", web::get().to(get_stats))
                    .route("/account", web::delete().to(delete_account)),
            ),
    );
}
