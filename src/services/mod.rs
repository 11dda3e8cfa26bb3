pub mod admin;
pub mod auth;
pub mod evaluations;
pub mod hackathon;
pub mod judge;
pub mod notifications;
pub mod projects;
pub mod teams;
pub mod users;

pub use admin::AdminService;
pub use auth::AuthService;
pub use evaluations::EvaluationService;
pub use hackathon::HackathonService;
pub use judge::JudgeService;
pub use notifications::NotificationService;
pub use projects::ProjectService;
pub use teams::TeamService;
pub use users::UserService;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::HackflowError;
use crate::models::{ApiResponse, ErrorCode};

/// 排行榜缓存键
pub(crate) const LEADERBOARD_CACHE_KEY: &str = "leaderboard:top";

/// 将业务错误转换为 HTTP 响应
///
/// 状态码由错误类型决定；服务端错误统一使用 `InternalServerError` 错误码并记录日志。
pub(crate) fn error_response(err: &HackflowError, code: ErrorCode) -> HttpResponse {
    let status = err.status_code();
    if status.is_server_error() {
        error!("{}", err.format_simple());
        return HttpResponse::build(status).json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Internal server error: {}", err.message()),
        ));
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}

pub(crate) fn get_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

/// 评分变化后使排行榜缓存失效
pub(crate) async fn invalidate_leaderboard(request: &HttpRequest) {
    if let Some(cache) = get_cache(request) {
        cache.remove(LEADERBOARD_CACHE_KEY).await;
    }
}
