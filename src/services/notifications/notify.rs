//! 评审完成通知
//!
//! 通知在独立任务中写入，失败只记录日志，不影响评审结果。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{HackflowError, Result};
use crate::models::notifications::{
    entities::{Notification, NotificationType},
    requests::CreateNotificationRequest,
};
use crate::storage::Storage;

/// 通知项目所属队伍的全部成员其项目收到新的评审
pub async fn notify_evaluation_completed(
    storage: &Arc<dyn Storage>,
    project_id: i64,
    average_score: f64,
) -> Result<Vec<Notification>> {
    let project = storage
        .get_project_by_id(project_id)
        .await?
        .ok_or_else(|| HackflowError::not_found("Project not found"))?;
    let members = storage.list_team_members(project.team_id).await?;

    let mut sent = Vec::with_capacity(members.len());
    for member in members {
        let notification = storage
            .create_notification(CreateNotificationRequest {
                user_id: member.user_id,
                notification_type: NotificationType::EvaluationCompleted,
                title: format!("New evaluation for \"{}\"", project.title),
                content: Some(format!(
                    "Your project has been evaluated. Current average score: {average_score:.2}"
                )),
                reference_type: Some("project".to_string()),
                reference_id: Some(project_id),
            })
            .await?;
        sent.push(notification);
    }
    Ok(sent)
}

pub fn spawn_evaluation_notice(storage: Arc<dyn Storage>, project_id: i64, average_score: f64) {
    tokio::spawn(async move {
        match notify_evaluation_completed(&storage, project_id, average_score).await {
            Ok(sent) => debug!(
                "{} notifications sent for project {}",
                sent.len(),
                project_id
            ),
            Err(e) => warn!(
                "Failed to notify team of project {}: {}",
                project_id,
                e.format_simple()
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    #[tokio::test]
    async fn test_notifies_every_team_member() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let mate = seed_user(&storage, "mate", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Lighthouse").await;
        let team = storage.get_team_by_id(project.team_id).await.unwrap().unwrap();
        storage
            .join_team(mate, team.invite_code.as_deref().unwrap())
            .await
            .unwrap();

        let sent = notify_evaluation_completed(&storage, project.id, 67.5)
            .await
            .unwrap();
        let mut recipients: Vec<i64> = sent.iter().map(|n| n.user_id).collect();
        recipients.sort();
        assert_eq!(recipients, vec![owner, mate]);
        assert_eq!(storage.get_unread_notification_count(mate).await.unwrap(), 1);

        let notification = sent.into_iter().find(|n| n.user_id == owner).unwrap();
        assert_eq!(
            notification.notification_type,
            NotificationType::EvaluationCompleted
        );
        assert!(notification.content.as_deref().unwrap().ends_with("67.50"));
        assert!(!notification.is_read);

        let unread = storage.get_unread_notification_count(owner).await.unwrap();
        assert_eq!(unread, 1);

        let page = storage
            .list_notifications_with_pagination(
                owner,
                NotificationListQuery {
                    page: None,
                    size: None,
                    unread_only: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].reference_id, Some(project.id));
    }

    #[tokio::test]
    async fn test_missing_project_is_reported() {
        let storage = memory_storage().await;
        let err = notify_evaluation_completed(&storage, 42, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_read_checks_ownership() {
        let storage = memory_storage().await;
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let stranger = seed_user(&storage, "stranger", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Beacon").await;

        let notification = notify_evaluation_completed(&storage, project.id, 50.0)
            .await
            .unwrap()
            .remove(0);

        assert!(
            !storage
                .mark_notification_as_read(notification.id, stranger)
                .await
                .unwrap()
        );
        assert!(
            storage
                .mark_notification_as_read(notification.id, owner)
                .await
                .unwrap()
        );
        assert_eq!(storage.get_unread_notification_count(owner).await.unwrap(), 0);
    }
}
