/*!
 * 速率限制中间件
 *
 * 以用户 ID（已认证时）或客户端 IP 计数，超过限制返回 429。
 * 计数窗口固定为 60 秒。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

const WINDOW_SECS: u64 = 60;

/// 键: 前缀:身份，值: 窗口内请求计数
static RATE_LIMIT_CACHE: Lazy<Cache<String, u32>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

/// 原子递增计数并返回递增后的值
async fn bump(key: String) -> u32 {
    RATE_LIMIT_CACHE
        .entry(key)
        .and_upsert_with(|existing| {
            let next = existing.map(|entry| entry.into_value() + 1).unwrap_or(1);
            std::future::ready(next)
        })
        .await
        .into_value()
}

fn limit_key(prefix: &str, identifier: &str) -> String {
    if prefix.is_empty() {
        identifier.to_string()
    } else {
        format!("{prefix}:{identifier}")
    }
}

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    key_prefix: String,
}

impl RateLimit {
    /// 每个窗口最多 `max_requests` 次
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            key_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    pub fn login() -> Self {
        Self::new(5).with_prefix("login")
    }

    pub fn register() -> Self {
        Self::new(3).with_prefix("register")
    }

    pub fn refresh_token() -> Self {
        Self::new(10).with_prefix("refresh")
    }

    pub fn file_upload() -> Self {
        Self::new(10).with_prefix("upload")
    }

    /// 评审提交与修改
    pub fn evaluation() -> Self {
        Self::new(30).with_prefix("evaluation")
    }
}

/// 计数身份：已认证用户按 ID，否则按客户端 IP
///
/// `realip_remote_addr` 已考虑 Forwarded / X-Forwarded-For，仅在反向代理后部署时可信。
fn identity(req: &ServiceRequest) -> String {
    if let Some(user) = req.extensions().get::<User>() {
        return format!("user:{}", user.id);
    }
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    format!("ip:{ip}")
}

fn create_rate_limit_response() -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", WINDOW_SECS.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let max_requests = self.max_requests;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            let cache_key = limit_key(&key_prefix, &identity(&req));

            let count = bump(cache_key.clone()).await;
            if count > max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, count, max_requests
                );
                return Ok(req.into_response(create_rate_limit_response().map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.key_prefix, "login");
        assert_eq!(RateLimit::evaluation().max_requests, 30);
    }

    #[test]
    fn test_limit_key() {
        assert_eq!(limit_key("login", "ip:127.0.0.1"), "login:ip:127.0.0.1");
        assert_eq!(limit_key("", "user:7"), "user:7");
    }

    #[test]
    fn test_identity_prefers_user() {
        use actix_web::test::TestRequest;

        let req = TestRequest::default()
            .peer_addr("10.0.0.7:5000".parse().unwrap())
            .to_srv_request();
        assert_eq!(identity(&req), "ip:10.0.0.7");
    }

    #[tokio::test]
    async fn test_bump_counts_per_key() {
        let key = format!("test:{}", uuid::Uuid::new_v4());
        assert_eq!(bump(key.clone()).await, 1);
        assert_eq!(bump(key.clone()).await, 2);
        assert_eq!(bump(format!("{key}:other")).await, 1);
    }
}
