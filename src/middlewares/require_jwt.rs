/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，按令牌中的用户 ID 加载用户并写入请求扩展，
 * 处理程序通过 [`RequireJWT::extract_user_claims`] 等方法读取。
 * 停用账号返回 403，其余认证失败返回 401。
 *
 * ```rust,ignore
 * web::scope("/api/v1/notifications")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_notifications))
 * ```
 *
 * 用户信息按 ID 缓存在对象缓存中，角色或状态变更后调用 [`invalidate_cached_user`]。
 */

use crate::cache::{CacheResult, ObjectCache, ObjectCacheExt};
use crate::config::AppConfig;
use crate::middlewares::create_error_response;
use crate::models::ErrorCode;
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{StatusCode, header::AUTHORIZATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

fn user_cache_key(user_id: i64) -> String {
    format!("auth:user:{user_id}")
}

/// 用户角色或状态变更后清除缓存
pub async fn invalidate_cached_user(cache: &Arc<dyn ObjectCache>, user_id: i64) {
    cache.remove(&user_cache_key(user_id)).await;
}

/// 认证失败的原因，决定响应状态码
enum AuthFailure {
    MissingToken,
    InvalidToken,
    UnknownUser,
    Inactive,
    Backend,
}

impl AuthFailure {
    fn respond(&self) -> actix_web::HttpResponse {
        let (status, code, message) = match self {
            AuthFailure::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Missing or invalid Authorization header",
            ),
            AuthFailure::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Invalid or expired access token",
            ),
            AuthFailure::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "User no longer exists",
            ),
            AuthFailure::Inactive => (
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "Account is disabled",
            ),
            AuthFailure::Backend => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to load user",
            ),
        };
        create_error_response(status, code, message)
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 缓存未命中时回源存储并回填
async fn load_user(req: &ServiceRequest, user_id: i64) -> Result<Option<User>, AuthFailure> {
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone());
    let cache_key = user_cache_key(user_id);

    if let Some(cache) = &cache {
        match cache.get_json::<User>(&cache_key).await {
            CacheResult::Found(user) => return Ok(Some(user)),
            CacheResult::ExistsButNoValue => cache.remove(&cache_key).await,
            CacheResult::NotFound => {}
        }
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();
    let user = storage.get_user_by_id(user_id).await.map_err(|e| {
        warn!("Failed to load user {} for authentication: {}", user_id, e);
        AuthFailure::Backend
    })?;

    if let (Some(cache), Some(user)) = (&cache, &user) {
        cache
            .insert_json(cache_key, user, AppConfig::get().cache.default_ttl)
            .await;
    }
    Ok(user)
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthFailure> {
    let token = bearer_token(req).ok_or(AuthFailure::MissingToken)?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        debug!("Access token rejected: {}", err);
        AuthFailure::InvalidToken
    })?;
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthFailure::InvalidToken)?;

    let user = load_user(req, user_id)
        .await?
        .ok_or(AuthFailure::UnknownUser)?;
    if !user.is_active() {
        return Err(AuthFailure::Inactive);
    }
    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    actix_web::HttpResponse::NoContent()
                        .finish()
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("Authenticated user {} ({})", user.id, user.role);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(failure) => {
                    info!("Authentication failed for {}", req.path());
                    let response = failure.respond();
                    Ok(req.into_response(response.map_into_right_body()))
                }
            }
        })
    }
}

// 处理程序读取当前用户，仅在 RequireJWT 保护的路由中有值
impl RequireJWT {
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer   "))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        assert_eq!(bearer_token(&TestRequest::default().to_srv_request()), None);
    }

    #[test]
    fn test_inactive_accounts_get_forbidden() {
        assert_eq!(AuthFailure::Inactive.respond().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthFailure::InvalidToken.respond().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
