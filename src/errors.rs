//! 统一错误类型
//!
//! 存储层与业务逻辑返回 [`HackflowError`]，服务层通过 [`HackflowError::status_code`] 映射为 HTTP 响应。

use std::fmt;

/// 由 `变体(错误代码, 类型名称)` 列表生成错误枚举、访问方法和 snake_case 构造函数
macro_rules! define_hackflow_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum HackflowError {
            $($variant(String),)*
        }

        impl HackflowError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(HackflowError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(HackflowError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(HackflowError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl HackflowError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        HackflowError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_hackflow_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    FileOperation("E005", "File Operation Error"),
    Serialization("E006", "Serialization Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    DuplicateEvaluation("E009", "Duplicate Evaluation"),
    Conflict("E010", "Concurrent Modification Conflict"),
    InvalidState("E011", "Invalid State Transition"),
    DateParse("E012", "Date Parse Error"),
}

impl HackflowError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            HackflowError::Validation(_)
            | HackflowError::DuplicateEvaluation(_)
            | HackflowError::InvalidState(_)
            | HackflowError::DateParse(_) => StatusCode::BAD_REQUEST,
            HackflowError::NotFound(_) => StatusCode::NOT_FOUND,
            HackflowError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为唯一约束冲突
    pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
        matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for HackflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HackflowError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for HackflowError {
    fn from(err: sea_orm::DbErr) -> Self {
        HackflowError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for HackflowError {
    fn from(err: std::io::Error) -> Self {
        HackflowError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for HackflowError {
    fn from(err: serde_json::Error) -> Self {
        HackflowError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for HackflowError {
    fn from(err: chrono::ParseError) -> Self {
        HackflowError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HackflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_codes_and_types() {
        assert_eq!(HackflowError::cache_connection("x").code(), "E001");
        assert_eq!(HackflowError::validation("x").code(), "E007");
        assert_eq!(HackflowError::invalid_state("x").code(), "E011");
        assert_eq!(
            HackflowError::duplicate_evaluation("x").error_type(),
            "Duplicate Evaluation"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (HackflowError::duplicate_evaluation("dup"), StatusCode::BAD_REQUEST),
            (HackflowError::invalid_state("draft"), StatusCode::BAD_REQUEST),
            (HackflowError::not_found("gone"), StatusCode::NOT_FOUND),
            (HackflowError::conflict("stale"), StatusCode::CONFLICT),
            (
                HackflowError::database_operation("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err.format_simple());
        }
    }

    #[test]
    fn test_conversions_keep_message() {
        let err: HackflowError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(matches!(err, HackflowError::Serialization(_)));

        let err: HackflowError = chrono::DateTime::parse_from_rfc3339("next tuesday")
            .unwrap_err()
            .into();
        assert!(matches!(err, HackflowError::DateParse(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = HackflowError::validation("Invalid URL");
        assert_eq!(err.to_string(), "Validation Error: Invalid URL");
    }
}
