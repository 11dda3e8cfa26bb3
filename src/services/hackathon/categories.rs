use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use super::HackathonService;
use crate::errors::HackflowError;
use crate::models::categories::entities::slugify;
use crate::models::categories::requests::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Invalid slug regex"));

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid color regex"));

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const SLUG_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 500;

fn check_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(format!(
            "Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

fn check_common(
    description: Option<&String>,
    color: Option<&String>,
    prize_amount: Option<f64>,
    max_teams: Option<i64>,
) -> Result<(), String> {
    if let Some(description) = description
        && description.chars().count() > DESCRIPTION_MAX_CHARS
    {
        return Err(format!(
            "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
        ));
    }
    if let Some(color) = color
        && !COLOR_RE.is_match(color)
    {
        return Err("Color must be a hex value like #1A2B3C".to_string());
    }
    if prize_amount.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err("Prize amount cannot be negative".to_string());
    }
    if max_teams.is_some_and(|m| m < 0) {
        return Err("Max teams cannot be negative".to_string());
    }
    Ok(())
}

/// 校验创建请求并确定 slug，未给出时由名称生成
pub(crate) fn resolve_slug(req: &CreateCategoryRequest) -> Result<String, String> {
    check_name(&req.name)?;
    check_common(
        req.description.as_ref(),
        req.color.as_ref(),
        req.prize_amount,
        req.max_teams,
    )?;

    let slug = match req.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&req.name),
    };
    if slug.len() > SLUG_MAX_CHARS || !SLUG_RE.is_match(&slug) {
        return Err(
            "Slug must contain lowercase letters, numbers and single hyphens only".to_string(),
        );
    }
    Ok(slug)
}

fn validate_update(req: &UpdateCategoryRequest) -> Result<(), String> {
    if let Some(ref name) = req.name {
        check_name(name)?;
    }
    check_common(
        req.description.as_ref(),
        req.color.as_ref(),
        req.prize_amount,
        req.max_teams,
    )
}

pub async fn list_categories(
    service: &HackathonService,
    request: &HttpRequest,
    active_only: bool,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_categories(active_only).await {
        Ok(categories) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            categories,
            "Categories retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn create_category(
    service: &HackathonService,
    request: &HttpRequest,
    req: CreateCategoryRequest,
) -> ActixResult<HttpResponse> {
    let slug = match resolve_slug(&req) {
        Ok(slug) => slug,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ValidationFailed,
                msg,
            )));
        }
    };

    let storage = service.get_storage(request);

    match storage.create_category(slug, req).await {
        Ok(category) => {
            info!("Category {} ({}) created", category.id, category.slug);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                category,
                "Category created successfully",
            )))
        }
        Err(e @ HackflowError::Conflict(_)) => {
            Ok(error_response(&e, ErrorCode::CategoryAlreadyExists))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_category(
    service: &HackathonService,
    request: &HttpRequest,
    category_id: i64,
    req: UpdateCategoryRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_update(&req) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            msg,
        )));
    }

    let storage = service.get_storage(request);

    match storage.update_category(category_id, req).await {
        Ok(Some(category)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            category,
            "Category updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CategoryNotFound,
            "Category not found",
        ))),
        Err(e @ HackflowError::Conflict(_)) => {
            Ok(error_response(&e, ErrorCode::CategoryAlreadyExists))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub async fn delete_category(
    service: &HackathonService,
    request: &HttpRequest,
    category_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_category(category_id).await {
        Ok(true) => {
            info!("Category {} deleted", category_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Category deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CategoryNotFound,
            "Category not found",
        ))),
        Err(e @ HackflowError::InvalidState(_)) => {
            Ok(error_response(&e, ErrorCode::CategoryInUse))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_category, seed_team, seed_user,
    };

    fn create(name: &str, slug: Option<&str>) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            slug: slug.map(str::to_string),
            description: None,
            icon: None,
            color: Some("#FF8800".to_string()),
            prize_amount: Some(1000.0),
            max_teams: None,
            display_order: Some(1),
            is_active: None,
        }
    }

    #[test]
    fn test_slug_resolution() {
        assert_eq!(resolve_slug(&create("Health Tech", None)).unwrap(), "health-tech");
        assert_eq!(resolve_slug(&create("Health Tech", Some("med"))).unwrap(), "med");
        assert!(resolve_slug(&create("Health Tech", Some("Med Tech"))).is_err());
        // 名称无法生成 slug 时必须显式给出
        assert!(resolve_slug(&create("智能硬件", None)).is_err());

        let mut bad_color = create("Games", None);
        bad_color.color = Some("orange".to_string());
        assert!(resolve_slug(&bad_color).is_err());
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let storage = memory_storage().await;
        let created = storage
            .create_category("fintech".to_string(), create("FinTech", None))
            .await
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.prize_amount, 1000.0);

        let err = storage
            .create_category("fintech".to_string(), create("Money", None))
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::Conflict(_)));

        let hidden = storage
            .update_category(
                created.id,
                UpdateCategoryRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!hidden.is_active);
        assert!(storage.list_categories(true).await.unwrap().is_empty());
        assert_eq!(storage.list_categories(false).await.unwrap().len(), 1);

        assert!(storage.delete_category(created.id).await.unwrap());
        assert!(!storage.delete_category(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let storage = memory_storage().await;
        let leader = seed_user(&storage, "leader", UserRole::Participant).await;
        seed_team(&storage, leader, "Users").await;
        let web = seed_category(&storage, "web").await;

        let err = storage.delete_category(web.id).await.unwrap_err();
        assert!(matches!(err, HackflowError::InvalidState(_)));
    }
}
