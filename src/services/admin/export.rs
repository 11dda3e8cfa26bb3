//! 数据导出
//!
//! 以 JSON 附件形式导出用户、队伍、项目或评审，单次最多 `EXPORT_LIMIT` 条。

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::AdminService;
use crate::errors::Result;
use crate::models::teams::requests::TeamListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub const EXPORT_LIMIT: u64 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Users,
    Teams,
    Projects,
    Evaluations,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "users" => Ok(ExportKind::Users),
            "teams" => Ok(ExportKind::Teams),
            "projects" => Ok(ExportKind::Projects),
            "evaluations" => Ok(ExportKind::Evaluations),
            _ => Err(format!("Invalid export type: {s}")),
        }
    }
}

impl ExportKind {
    fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Users => "users",
            ExportKind::Teams => "teams",
            ExportKind::Projects => "projects",
            ExportKind::Evaluations => "evaluations",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub kind: &'static str,
    pub exported_at: chrono::DateTime<chrono::Utc>,
    pub count: usize,
    pub items: serde_json::Value,
}

fn document<T: Serialize>(kind: ExportKind, items: Vec<T>) -> Result<ExportDocument> {
    Ok(ExportDocument {
        kind: kind.as_str(),
        exported_at: chrono::Utc::now(),
        count: items.len(),
        items: serde_json::to_value(items)?,
    })
}

pub(crate) async fn collect_export(
    storage: &Arc<dyn Storage>,
    kind: ExportKind,
) -> Result<ExportDocument> {
    match kind {
        ExportKind::Users => document(kind, storage.list_users_for_export(EXPORT_LIMIT).await?),
        ExportKind::Teams => {
            let mut teams = storage.list_teams(TeamListQuery::default()).await?;
            teams.truncate(EXPORT_LIMIT as usize);
            document(kind, teams)
        }
        ExportKind::Projects => {
            document(kind, storage.list_projects_for_export(EXPORT_LIMIT).await?)
        }
        ExportKind::Evaluations => document(
            kind,
            storage.list_evaluations_for_export(EXPORT_LIMIT).await?,
        ),
    }
}

pub async fn export_data(
    service: &AdminService,
    request: &HttpRequest,
    kind: &str,
) -> ActixResult<HttpResponse> {
    let kind: ExportKind = match kind.parse() {
        Ok(kind) => kind,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                msg,
            )));
        }
    };

    let storage = service.get_storage(request);

    match collect_export(&storage, kind).await {
        Ok(doc) => {
            info!("Exported {} {}", doc.count, doc.kind);
            let filename = format!(
                "hackflow-{}-{}.json",
                doc.kind,
                doc.exported_at.format("%Y%m%d%H%M%S")
            );
            Ok(HttpResponse::Ok()
                .content_type("application/json")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(filename)],
                })
                .json(doc))
        }
        Err(e) => {
            error!("导出{}失败: {}", kind.as_str(), e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Export failed: {e}"),
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[test]
    fn test_export_kind_parsing() {
        assert_eq!("teams".parse::<ExportKind>().unwrap(), ExportKind::Teams);
        assert!("passwords".parse::<ExportKind>().is_err());
    }

    #[tokio::test]
    async fn test_export_hides_secrets() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        seed_user(&storage, "judge", UserRole::Judge).await;
        seed_submitted_project(&storage, owner, "Exported").await;

        let users = collect_export(&storage, ExportKind::Users).await.unwrap();
        assert_eq!(users.count, 2);
        assert!(users.items[0].get("password_hash").is_none());

        let teams = collect_export(&storage, ExportKind::Teams).await.unwrap();
        assert_eq!(teams.count, 1);
        assert!(teams.items[0].get("invite_code").is_some());

        let projects = collect_export(&storage, ExportKind::Projects).await.unwrap();
        assert_eq!(projects.count, 1);
        assert_eq!(projects.items[0]["title"], "Exported");

        let evaluations = collect_export(&storage, ExportKind::Evaluations)
            .await
            .unwrap();
        assert_eq!(evaluations.count, 0);
    }
}
