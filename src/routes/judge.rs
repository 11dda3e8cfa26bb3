use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::missing_user;
use crate::middlewares::{self, RateLimit, RequireJWT};
use crate::models::evaluations::requests::{SubmitEvaluationRequest, UpdateEvaluationRequest};
use crate::models::judge::requests::JudgeProjectQuery;
use crate::models::users::entities::UserRole;
use crate::services::{EvaluationService, JudgeService};
use crate::utils::SafeIDI64;

static JUDGE_SERVICE: Lazy<JudgeService> = Lazy::new(JudgeService::new_lazy);
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

// 待评项目
pub async fn list_projects(
    req: HttpRequest,
    query: web::Query<JudgeProjectQuery>,
) -> ActixResult<HttpResponse> {
    let Some(judge_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    JUDGE_SERVICE
        .list_projects(&req, judge_id, query.into_inner())
        .await
}

pub async fn list_my_evaluations(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(judge_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    JUDGE_SERVICE.list_my_evaluations(&req, judge_id).await
}

pub async fn get_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(judge_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    JUDGE_SERVICE.get_stats(&req, judge_id).await
}

// 提交评审
pub async fn submit_evaluation(
    req: HttpRequest,
    body: web::Json<SubmitEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    let Some(judge_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    EVALUATION_SERVICE
        .submit_evaluation(&req, judge_id, body.into_inner())
        .await
}

// 修改自己的评审
pub async fn update_evaluation(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    let Some(judge_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    EVALUATION_SERVICE
        .update_evaluation(&req, judge_id, path.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_judge_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/judge")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::judge_roles()))
                    .route("/projects", web::get().to(list_projects))
                    .route("/my-evaluations", web::get().to(list_my_evaluations))
                    .route("/stats", web::get().to(get_stats))
                    .service(
                        web::resource("/evaluate")
                            .wrap(RateLimit::evaluation())
                            .route(web::post().to(submit_evaluation)),
                    )
                    .service(
                        web::resource("/evaluate/{id}")
                            .wrap(RateLimit::evaluation())
                            .route(web::put().to(update_evaluation)),
                    ),
            ),
    );
}
