use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ISSUER: &str = "hackflow";
const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户 ID
    pub role: String,
    pub token_type: TokenType,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign(
    secret: &str,
    user_id: i64,
    role: &str,
    token_type: TokenType,
    ttl: chrono::Duration,
) -> Result<String, JwtError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        token_type,
        iss: ISSUER.to_string(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn verify(secret: &str, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.token_type != expected {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static str {
        &AppConfig::get().jwt.secret
    }

    pub fn generate_access_token(user_id: i64, role: &str) -> Result<String, JwtError> {
        let ttl = chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry);
        sign(Self::secret(), user_id, role, TokenType::Access, ttl)
    }

    /// `ttl` 为空时使用配置的刷新令牌有效期
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
        ttl: Option<chrono::Duration>,
    ) -> Result<String, JwtError> {
        let ttl = ttl
            .unwrap_or_else(|| chrono::Duration::days(AppConfig::get().jwt.refresh_token_expiry));
        sign(Self::secret(), user_id, role, TokenType::Refresh, ttl)
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        refresh_ttl: Option<chrono::Duration>,
    ) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, role)?,
            refresh_token: Self::generate_refresh_token(user_id, role, refresh_ttl)?,
        })
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, JwtError> {
        verify(Self::secret(), token, TokenType::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, JwtError> {
        verify(Self::secret(), token, TokenType::Refresh)
    }

    /// 使用刷新令牌换取新的访问令牌
    pub fn refresh_access_token(refresh_token: &str) -> Result<String, JwtError> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::from(ErrorKind::InvalidToken))?;
        Self::generate_access_token(user_id, &claims.role)
    }

    pub fn create_refresh_token_cookie(refresh_token: &str) -> Cookie<'static> {
        let config = AppConfig::get();
        Cookie::build(REFRESH_COOKIE, refresh_token.to_string())
            .path("/")
            .max_age(actix_web::cookie::time::Duration::days(
                config.jwt.refresh_token_expiry,
            ))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(config.is_production())
            .finish()
    }

    /// 用于登出：立即过期的空 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, "")
            .path("/")
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_sign_and_verify() {
        let token = sign(SECRET, 7, "judge", TokenType::Access, chrono::Duration::minutes(5))
            .unwrap();
        let claims = verify(SECRET, &token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "judge");
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let refresh = sign(SECRET, 7, "judge", TokenType::Refresh, chrono::Duration::days(1))
            .unwrap();
        assert!(verify(SECRET, &refresh, TokenType::Access).is_err());
        assert!(verify(SECRET, &refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_wrong_secret_or_expired() {
        let token = sign(SECRET, 1, "admin", TokenType::Access, chrono::Duration::minutes(5))
            .unwrap();
        assert!(verify("other-secret", &token, TokenType::Access).is_err());

        let expired = sign(SECRET, 1, "admin", TokenType::Access, chrono::Duration::hours(-2))
            .unwrap();
        assert!(verify(SECRET, &expired, TokenType::Access).is_err());
    }
}
