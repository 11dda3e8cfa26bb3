//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod categories;
mod evaluations;
mod files;
mod hackathon;
mod notifications;
mod projects;
mod teams;
mod users;

use crate::config::{AppConfig, CriterionWeights, DatabaseConfig};
use crate::errors::{HackflowError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 按数据库配置连接并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url == SQLITE_MEMORY_URL {
            Self::connect_sqlite_memory().await?
        } else if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| HackflowError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| HackflowError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| HackflowError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// SQLite 内存库：单连接且不回收，连接关闭即丢失数据
    async fn connect_sqlite_memory() -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(SQLITE_MEMORY_URL)
            .map_err(|e| HackflowError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| HackflowError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| HackflowError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url == ":memory:" || url == SQLITE_MEMORY_URL {
            Ok(SQLITE_MEMORY_URL.to_string())
        } else if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(HackflowError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}


// Storage trait 实现
use crate::models::{
    admin::responses::LabelCount,
    categories::{
        entities::Category,
        requests::{CreateCategoryRequest, UpdateCategoryRequest},
    },
    evaluations::entities::{Evaluation, EvaluationOutcome, EvaluationRecord},
    files::entities::{NewProjectFile, ProjectFile},
    hackathon::{entities::HackathonSettings, requests::HackathonSettingsPatch},
    judge::{
        requests::JudgeProjectQuery,
        responses::{JudgeEvaluationItem, JudgeProjectItem},
    },
    notifications::{
        entities::Notification,
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    projects::{
        entities::{Project, ProjectScore, SubmissionStatus},
        requests::{CreateProjectRequest, ProjectListQuery, UpdateProjectRequest},
        responses::{LeaderboardEntry, ProjectListResponse},
    },
    teams::{
        entities::{Team, TeamMember},
        requests::{CreateTeamRequest, TeamListQuery, UpdateTeamRequest},
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn count_users_by_role(&self) -> Result<Vec<LabelCount>> {
        self.count_users_by_role_impl().await
    }

    async fn search_users(&self, keyword: &str, limit: u64) -> Result<Vec<User>> {
        self.search_users_impl(keyword, limit).await
    }

    async fn list_users_for_export(&self, limit: u64) -> Result<Vec<User>> {
        self.list_users_for_export_impl(limit).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        self.delete_user_impl(user_id).await
    }

    // 队伍模块
    async fn create_team(&self, leader_id: i64, team: CreateTeamRequest) -> Result<Team> {
        self.create_team_impl(leader_id, team).await
    }

    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>> {
        self.get_team_by_id_impl(team_id).await
    }

    async fn get_team_by_member(&self, user_id: i64) -> Result<Option<Team>> {
        self.get_team_by_member_impl(user_id).await
    }

    async fn list_teams(&self, query: TeamListQuery) -> Result<Vec<Team>> {
        self.list_teams_impl(query).await
    }

    async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        self.list_team_members_impl(team_id).await
    }

    async fn update_team(&self, team_id: i64, update: UpdateTeamRequest) -> Result<Option<Team>> {
        self.update_team_impl(team_id, update).await
    }

    async fn join_team(&self, user_id: i64, invite_code: &str) -> Result<Team> {
        self.join_team_impl(user_id, invite_code).await
    }

    async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<()> {
        self.remove_team_member_impl(team_id, user_id).await
    }

    async fn delete_team(&self, team_id: i64) -> Result<bool> {
        self.delete_team_impl(team_id).await
    }

    async fn count_teams(&self) -> Result<u64> {
        self.count_teams_impl().await
    }

    // 赛道模块
    async fn list_categories(&self, active_only: bool) -> Result<Vec<Category>> {
        self.list_categories_impl(active_only).await
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.get_category_by_id_impl(id).await
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        self.get_category_by_slug_impl(slug).await
    }

    async fn create_category(
        &self,
        slug: String,
        category: CreateCategoryRequest,
    ) -> Result<Category> {
        self.create_category_impl(slug, category).await
    }

    async fn update_category(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>> {
        self.update_category_impl(id, update).await
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        self.delete_category_impl(id).await
    }

    // 赛事配置模块
    async fn get_hackathon_settings(&self) -> Result<Option<HackathonSettings>> {
        self.get_hackathon_settings_impl().await
    }

    async fn get_or_create_hackathon_settings(
        &self,
        default_weights: &CriterionWeights,
    ) -> Result<HackathonSettings> {
        self.get_or_create_hackathon_settings_impl(default_weights)
            .await
    }

    async fn update_hackathon_settings(
        &self,
        patch: HackathonSettingsPatch,
        default_weights: &CriterionWeights,
        user_id: i64,
    ) -> Result<HackathonSettings> {
        self.update_hackathon_settings_impl(patch, default_weights, user_id)
            .await
    }

    // 项目模块
    async fn create_project(
        &self,
        team_id: i64,
        created_by: i64,
        project: CreateProjectRequest,
    ) -> Result<Project> {
        self.create_project_impl(team_id, created_by, project).await
    }

    async fn get_project_by_id(&self, project_id: i64) -> Result<Option<Project>> {
        self.get_project_by_id_impl(project_id).await
    }

    async fn get_project_by_team(&self, team_id: i64) -> Result<Option<Project>> {
        self.get_project_by_team_impl(team_id).await
    }

    async fn update_project(
        &self,
        project_id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        self.update_project_impl(project_id, update).await
    }

    async fn submit_project(&self, project_id: i64) -> Result<Option<Project>> {
        self.submit_project_impl(project_id).await
    }

    async fn finalize_project(&self, project_id: i64) -> Result<Option<Project>> {
        self.finalize_project_impl(project_id).await
    }

    async fn delete_project(&self, project_id: i64) -> Result<bool> {
        self.delete_project_impl(project_id).await
    }

    async fn list_projects_with_pagination(
        &self,
        query: ProjectListQuery,
    ) -> Result<ProjectListResponse> {
        self.list_projects_with_pagination_impl(query).await
    }

    async fn list_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        self.list_leaderboard_impl(limit).await
    }

    async fn list_judgeable_projects(
        &self,
        judge_id: i64,
        query: JudgeProjectQuery,
    ) -> Result<Vec<JudgeProjectItem>> {
        self.list_judgeable_projects_impl(judge_id, query).await
    }

    async fn count_projects_in_statuses(&self, statuses: &[SubmissionStatus]) -> Result<u64> {
        self.count_projects_in_statuses_impl(statuses).await
    }

    async fn count_projects_by_status(&self) -> Result<Vec<LabelCount>> {
        self.count_projects_by_status_impl().await
    }

    async fn list_projects_for_export(&self, limit: u64) -> Result<Vec<Project>> {
        self.list_projects_for_export_impl(limit).await
    }

    // 评审模块
    async fn create_evaluation(
        &self,
        project_id: i64,
        judge_id: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome> {
        self.create_evaluation_impl(project_id, judge_id, record)
            .await
    }

    async fn update_evaluation(
        &self,
        evaluation_id: i64,
        expected_version: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome> {
        self.update_evaluation_impl(evaluation_id, expected_version, record)
            .await
    }

    async fn get_evaluation_by_id(&self, evaluation_id: i64) -> Result<Option<Evaluation>> {
        self.get_evaluation_by_id_impl(evaluation_id).await
    }

    async fn get_evaluation_by_project_and_judge(
        &self,
        project_id: i64,
        judge_id: i64,
    ) -> Result<Option<Evaluation>> {
        self.get_evaluation_by_project_and_judge_impl(project_id, judge_id)
            .await
    }

    async fn list_evaluations_by_project(&self, project_id: i64) -> Result<Vec<Evaluation>> {
        self.list_evaluations_by_project_impl(project_id).await
    }

    async fn list_evaluations_by_judge(&self, judge_id: i64) -> Result<Vec<JudgeEvaluationItem>> {
        self.list_evaluations_by_judge_impl(judge_id).await
    }

    async fn list_evaluations_for_export(&self, limit: u64) -> Result<Vec<Evaluation>> {
        self.list_evaluations_for_export_impl(limit).await
    }

    async fn count_evaluations_by_judge(&self, judge_id: i64) -> Result<u64> {
        self.count_evaluations_by_judge_impl(judge_id).await
    }

    async fn count_evaluations(&self, complete_only: bool) -> Result<u64> {
        self.count_evaluations_impl(complete_only).await
    }

    async fn compute_project_score(&self, project_id: i64) -> Result<ProjectScore> {
        self.compute_project_score_impl(project_id).await
    }

    async fn recalculate_project_score(
        &self,
        project_id: i64,
    ) -> Result<(ProjectScore, ProjectScore)> {
        self.recalculate_project_score_impl(project_id).await
    }

    // 附件模块
    async fn create_project_file(&self, file: NewProjectFile) -> Result<ProjectFile> {
        self.create_project_file_impl(file).await
    }

    async fn list_project_files(&self, project_id: i64) -> Result<Vec<ProjectFile>> {
        self.list_project_files_impl(project_id).await
    }

    // 通知模块
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64> {
        self.get_unread_notification_count_impl(user_id).await
    }

    async fn mark_notification_as_read(
        &self,
        notification_id: i64,
        user_id: i64,
    ) -> Result<bool> {
        self.mark_notification_as_read_impl(notification_id, user_id)
            .await
    }

    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_as_read_impl(user_id).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::SeaOrmStorage;
    use crate::config::DatabaseConfig;
    use crate::models::categories::{entities::Category, requests::CreateCategoryRequest};
    use crate::models::projects::entities::Project;
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::teams::{entities::Team, requests::CreateTeamRequest};
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::Storage;

    /// 已迁移的内存数据库
    pub(crate) async fn memory_storage() -> Arc<dyn Storage> {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        };
        Arc::new(
            SeaOrmStorage::connect(&config)
                .await
                .expect("in-memory sqlite should connect"),
        )
    }

    pub(crate) async fn seed_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> i64 {
        storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "hash".to_string(),
                role,
                display_name: None,
                avatar_url: None,
            })
            .await
            .expect("user should be created")
            .id
    }

    /// 创建赛道，已存在时直接返回
    pub(crate) async fn seed_category(storage: &Arc<dyn Storage>, slug: &str) -> Category {
        if let Some(existing) = storage
            .get_category_by_slug(slug)
            .await
            .expect("category lookup should succeed")
        {
            return existing;
        }

        storage
            .create_category(
                slug.to_string(),
                CreateCategoryRequest {
                    name: slug.to_uppercase(),
                    slug: None,
                    description: None,
                    icon: None,
                    color: None,
                    prize_amount: None,
                    max_teams: None,
                    display_order: None,
                    is_active: None,
                },
            )
            .await
            .expect("category should be created")
    }

    /// 在 web 赛道下创建由 leader_id 带领的队伍
    pub(crate) async fn seed_team(storage: &Arc<dyn Storage>, leader_id: i64, name: &str) -> Team {
        seed_category(storage, "web").await;
        storage
            .create_team(
                leader_id,
                CreateTeamRequest {
                    name: name.to_string(),
                    category: "web".to_string(),
                    description: None,
                    max_members: None,
                    required_skills: vec![],
                },
            )
            .await
            .expect("team should be created")
    }

    /// 为 owner_id 建队并提交项目
    pub(crate) async fn seed_submitted_project(
        storage: &Arc<dyn Storage>,
        owner_id: i64,
        title: &str,
    ) -> Project {
        let team = seed_team(storage, owner_id, &format!("{title} team")).await;
        let project = storage
            .create_project(
                team.id,
                owner_id,
                CreateProjectRequest {
                    title: title.to_string(),
                    tagline: None,
                    description: format!("{title} description"),
                    technologies: vec!["rust".to_string()],
                    demo_url: None,
                    video_url: None,
                    github_url: None,
                },
            )
            .await
            .expect("project should be created");

        storage
            .submit_project(project.id)
            .await
            .expect("project should be submitted")
            .expect("project exists")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            SQLITE_MEMORY_URL
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("hackflow.db").unwrap(),
            "sqlite://hackflow.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/hackflow").unwrap(),
            "postgres://u:p@localhost/hackflow"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }
}
