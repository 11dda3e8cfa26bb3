use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use super::missing_user;
use crate::middlewares::{self, RateLimit, RequireJWT};
use crate::models::projects::requests::{
    CreateProjectRequest, LeaderboardQuery, ProjectListParams, UpdateProjectRequest,
};
use crate::services::ProjectService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ProjectService 实例
static PROJECT_SERVICE: Lazy<ProjectService> = Lazy::new(ProjectService::new_lazy);

// 公开项目列表
pub async fn list_projects(
    req: HttpRequest,
    query: web::Query<ProjectListParams>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .list_projects(&req, query.into_inner().into())
        .await
}

pub async fn get_leaderboard(
    req: HttpRequest,
    query: web::Query<LeaderboardQuery>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .get_leaderboard(&req, query.into_inner())
        .await
}

pub async fn create_project(
    req: HttpRequest,
    body: web::Json<CreateProjectRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE
        .create_project(&req, &user, body.into_inner())
        .await
}

pub async fn get_my_project(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE.get_my_project(&req, &user).await
}

pub async fn get_project(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE.get_project(&req, &user, path.0).await
}

pub async fn update_project(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateProjectRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE
        .update_project(&req, user_id, path.0, body.into_inner())
        .await
}

pub async fn submit_project(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE.submit_project(&req, user_id, path.0).await
}

pub async fn delete_project(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE.delete_project(&req, &user, path.0).await
}

pub async fn upload_file(
    req: HttpRequest,
    path: SafeIDI64,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    PROJECT_SERVICE
        .upload_file(&req, user_id, path.0, payload)
        .await
}

// 配置路由
pub fn configure_project_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/projects")
            // 资源级 guard 使同路径的 POST 落到下方需认证的 scope
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .to(list_projects),
            )
            .route("/leaderboard", web::get().to(get_leaderboard))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("", web::post().to(create_project))
                    .route("/my", web::get().to(get_my_project))
                    .route("/{id}", web::get().to(get_project))
                    .route("/{id}", web::put().to(update_project))
                    .route("/{id}", web::delete().to(delete_project))
                    .route("/{id}/submit", web::post().to(submit_project))
                    .service(
                        web::resource("/{id}/files")
                            .wrap(RateLimit::file_upload())
                            .route(web::post().to(upload_file)),
                    ),
            ),
    );
}
