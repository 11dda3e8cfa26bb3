use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use super::missing_user;
use crate::middlewares::{self, RequireJWT};
use crate::models::teams::requests::{
    CreateTeamRequest, JoinTeamRequest, TeamListQuery, UpdateTeamRequest,
};
use crate::services::TeamService;
use crate::utils::{SafeIDI64, SafeUserIDI64};

static TEAM_SERVICE: Lazy<TeamService> = Lazy::new(TeamService::new_lazy);

// 公开队伍列表（不含邀请码）
pub async fn list_teams(
    req: HttpRequest,
    query: web::Query<TeamListQuery>,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.list_teams(&req, query.into_inner()).await
}

pub async fn create_team(
    req: HttpRequest,
    body: web::Json<CreateTeamRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE
        .create_team(&req, &user, body.into_inner())
        .await
}

pub async fn get_my_team(req: HttpRequest) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE.get_my_team(&req, user_id).await
}

pub async fn join_team(
    req: HttpRequest,
    body: web::Json<JoinTeamRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE.join_team(&req, &user, body.into_inner()).await
}

pub async fn get_team(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE.get_team(&req, user_id, path.0).await
}

pub async fn update_team(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateTeamRequest>,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE
        .update_team(&req, user_id, path.0, body.into_inner())
        .await
}

pub async fn delete_team(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE.delete_team(&req, user_id, path.0).await
}

pub async fn leave_team(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE.leave_team(&req, user_id, path.0).await
}

pub async fn remove_member(
    req: HttpRequest,
    path: SafeIDI64,
    member: SafeUserIDI64,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireJWT::extract_user_id(&req) else {
        return Ok(missing_user());
    };
    TEAM_SERVICE
        .remove_member(&req, user_id, path.0, member.0)
        .await
}

// 配置路由
pub fn configure_team_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teams")
            .service(web::resource("").guard(guard::Get()).to(list_teams))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("", web::post().to(create_team))
                    // 静态路径需在 /{id} 之前注册
                    .route("/my", web::get().to(get_my_team))
                    .route("/join", web::post().to(join_team))
                    .route("/{id}", web::get().to(get_team))
                    .route("/{id}", web::put().to(update_team))
                    .route("/{id}", web::delete().to(delete_team))
                    .route("/{id}/leave", web::post().to(leave_team))
                    .route(
                        "/{id}/members/{user_id}",
                        web::delete().to(remove_member),
                    ),
            ),
    );
}
