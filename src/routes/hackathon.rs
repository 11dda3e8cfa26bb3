use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::HackathonService;

pub(crate) static HACKATHON_SERVICE: Lazy<HackathonService> =
    Lazy::new(HackathonService::new_lazy);

// 公开赛事信息
pub async fn get_hackathon(req: HttpRequest) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE.get_settings(&req).await
}

// 启用中的赛道
pub async fn list_categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    HACKATHON_SERVICE.list_categories(&req, true).await
}

// 配置路由
pub fn configure_hackathon_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/hackathon", web::get().to(get_hackathon))
        .route("/api/v1/categories", web::get().to(list_categories));
}
