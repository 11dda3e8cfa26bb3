pub mod admin;

pub mod auth;

pub mod hackathon;

pub mod judge;

pub mod notifications;

pub mod projects;

pub mod teams;

pub mod users;

pub use admin::configure_admin_routes;
pub use auth::configure_auth_routes;
pub use hackathon::configure_hackathon_routes;
pub use judge::configure_judge_routes;
pub use notifications::configure_notification_routes;
pub use projects::configure_project_routes;
pub use teams::configure_team_routes;
pub use users::configure_user_routes;

use actix_web::HttpResponse;

use crate::models::{ApiResponse, ErrorCode};

// JWT 中间件已通过但请求扩展中没有用户
pub(crate) fn missing_user() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "无法获取用户信息",
    ))
}
