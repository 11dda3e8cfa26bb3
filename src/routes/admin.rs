use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::hackathon::HACKATHON_SERVICE;
use super::missing_user;
use crate::middlewares::{self, RequireJWT};
use crate::models::admin::requests::{UpdateUserRoleRequest, UpdateUserStatusRequest};
use crate::models::categories::requests::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::hackathon::requests::UpdateHackathonRequest;
use crate::models::projects::requests::ProjectListParams;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::UserListParams;
use crate::services::AdminService;
use crate::utils::SafeIDI64;

static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

pub async fn get_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_dashboard(&req).await
}

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .list_users(&req, query.into_inner().into())
        .await
}

pub async fn update_user_role(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateUserRoleRequest>,
) -> ActixResult<HttpResponse> {
    let Some(operator_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    ADMIN_SERVICE
        .update_user_role(&req, operator_id, path.0, body.into_inner())
        .await
}

pub async fn update_user_status(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateUserStatusRequest>,
) -> ActixResult<HttpResponse> {
    let Some(operator_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    ADMIN_SERVICE
        .update_user_status(&req, operator_id, path.0, body.into_inner())
        .await
}

// 按评审记录重新计算项目分数
pub async fn recalculate_project(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.recalculate_project(&req, path.0).await
}

pub async fn finalize_project(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.finalize_project(&req, path.0).await
}

// 全部提交，含草稿
pub async fn list_submissions(
    req: HttpRequest,
    query: web::Query<ProjectListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .list_submissions(&req, query.into_inner().into())
        .await
}

pub async fn export_data(req: HttpRequest, path: web::Path<String>) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.export_data(&req, &path.into_inner()).await
}

pub async fn get_hackathon(req: HttpRequest) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE.get_settings(&req).await
}

pub async fn update_hackathon(
    req: HttpRequest,
    body: web::Json<UpdateHackathonRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    HACKATHON_SERVICE
        .update_settings(&req, user_id, body.into_inner())
        .await
}

// 含停用赛道
pub async fn list_categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE.list_categories(&req, false).await
}

pub async fn create_category(
    req: HttpRequest,
    body: web::Json<CreateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE
        .create_category(&req, body.into_inner())
        .await
}

pub async fn update_category(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE
        .update_category(&req, path.0, body.into_inner())
        .await
}

pub async fn delete_category(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE.delete_category(&req, path.0).await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::Admin))
                    .route("/dashboard", web::get().to(get_dashboard))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{id}/role", web::put().to(update_user_role))
                    .route("/users/{id}/status", web::put().to(update_user_status))
                    .route(
                        "/projects/{id}/recalculate",
                        web::post().to(recalculate_project),
                    )
                    .route("/projects/{id}/finalize", web::post().to(finalize_project))
                    .route("/submissions", web::get().to(list_submissions))
                    .route("/export/{kind}", web::get().to(export_data))
                    .route("/hackathon", web::get().to(get_hackathon))
                    .route("/hackathon", web::put().to(update_hackathon))
                    .route("/categories", web::get().to(list_categories))
                    .route("/categories", web::post().to(create_category))
                    .route("/categories/{id}", web::put().to(update_category))
                    .route("/categories/{id}", web::delete().to(delete_category)),
            ),
    );
}
