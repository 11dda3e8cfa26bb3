use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::errors::HackflowError;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::RegisterRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

use super::AuthService;

/// 校验注册字段，返回错误码与提示
fn validate_registration(req: &RegisterRequest) -> Result<(), (ErrorCode, String)> {
    validate_username(&req.username)
        .map_err(|msg| (ErrorCode::UserNameInvalid, msg.to_string()))?;
    validate_email(&req.email).map_err(|msg| (ErrorCode::UserEmailInvalid, msg.to_string()))?;
    validate_password(&req.password).map_err(|msg| (ErrorCode::UserPasswordInvalid, msg))?;
    Ok(())
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err((code, msg)) = validate_registration(&register_request) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
    }

    if let Err(response) = check_username_exists(&storage, &register_request.username).await {
        return Ok(response);
    }
    if let Err(response) = check_email_exists(&storage, &register_request.email).await {
        return Ok(response);
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("Failed to hash password: {e}"),
                )),
            );
        }
    };

    // 公开注册只能创建参赛者
    let create_request = CreateUserRequest {
        username: register_request.username,
        email: register_request.email,
        password: password_hash,
        role: UserRole::Participant,
        display_name: register_request.display_name,
        avatar_url: None,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("User {} registered", user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "Registration successful")))
        }
        // 并发注册在预检查之后撞上唯一约束
        Err(HackflowError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserNameAlreadyExists, msg),
        )),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Registration failed: {e}"),
            )),
        ),
    }
}

async fn check_username_exists(
    storage: &Arc<dyn Storage>,
    username: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_username(username).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Register failed: {e}"),
            )),
        ),
    }
}

async fn check_email_exists(storage: &Arc<dyn Storage>, email: &str) -> Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("Register failed: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        }
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&request("hacker", "h@example.com", "Str0ngPass")).is_ok());

        let (code, _) =
            validate_registration(&request("ab", "h@example.com", "Str0ngPass")).unwrap_err();
        assert_eq!(code, ErrorCode::UserNameInvalid);

        let (code, _) =
            validate_registration(&request("hacker", "not-an-email", "Str0ngPass")).unwrap_err();
        assert_eq!(code, ErrorCode::UserEmailInvalid);

        let (code, _) =
            validate_registration(&request("hacker", "h@example.com", "weak")).unwrap_err();
        assert_eq!(code, ErrorCode::UserPasswordInvalid);
    }
}
