use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径参数 `{id}`，必须是正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

/// 路径参数 `{user_id}`，用于嵌套资源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeUserIDI64(pub i64);

fn parse_positive_id(raw: Option<&str>) -> Result<i64, &'static str> {
    let raw = raw.ok_or("Missing path parameter: id")?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err("Invalid id: must be a positive integer"),
    }
}

fn extract_id(req: &HttpRequest, key: &str) -> Result<i64, actix_web::Error> {
    parse_positive_id(req.match_info().get(key)).map_err(|msg| {
        InternalError::from_response(
            msg,
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)),
        )
        .into()
    })
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_id(req, "id").map(SafeIDI64))
    }
}

impl FromRequest for SafeUserIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_id(req, "user_id").map(SafeUserIDI64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("42")), Ok(42));
        assert!(parse_positive_id(Some("0")).is_err());
        assert!(parse_positive_id(Some("-3")).is_err());
        assert!(parse_positive_id(Some("abc")).is_err());
        assert!(parse_positive_id(None).is_err());
    }
}
