use std::sync::Arc;

use crate::config::CriterionWeights;
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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 按角色统计用户数量
    async fn count_users_by_role(&self) -> Result<Vec<LabelCount>>;
    // 搜索启用状态的用户
    async fn search_users(&self, keyword: &str, limit: u64) -> Result<Vec<User>>;
    // 导出用户
    async fn list_users_for_export(&self, limit: u64) -> Result<Vec<User>>;
    // 注销账号
    async fn delete_user(&self, user_id: i64) -> Result<bool>;

    /// 队伍方法
    // 创建队伍（创建者为队长）
    async fn create_team(&self, leader_id: i64, team: CreateTeamRequest) -> Result<Team>;
    // 通过ID获取队伍
    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>>;
    // 获取用户所在队伍
    async fn get_team_by_member(&self, user_id: i64) -> Result<Option<Team>>;
    // 列出队伍
    async fn list_teams(&self, query: TeamListQuery) -> Result<Vec<Team>>;
    // 列出队伍成员
    async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>>;
    // 更新队伍信息
    async fn update_team(&self, team_id: i64, update: UpdateTeamRequest) -> Result<Option<Team>>;
    // 通过邀请码加入队伍
    async fn join_team(&self, user_id: i64, invite_code: &str) -> Result<Team>;
    // 移除队员（含主动退出）
    async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<()>;
    // 解散队伍
    async fn delete_team(&self, team_id: i64) -> Result<bool>;
    // 统计队伍数量
    async fn count_teams(&self) -> Result<u64>;

    /// 赛道方法
    // 列出赛道
    async fn list_categories(&self, active_only: bool) -> Result<Vec<Category>>;
    // 通过ID获取赛道
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>>;
    // 通过 slug 获取赛道
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;
    // 创建赛道
    async fn create_category(&self, slug: String, category: CreateCategoryRequest)
    -> Result<Category>;
    // 更新赛道
    async fn update_category(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>>;
    // 删除赛道
    async fn delete_category(&self, id: i64) -> Result<bool>;

    /// 赛事配置方法
    // 读取赛事配置
    async fn get_hackathon_settings(&self) -> Result<Option<HackathonSettings>>;
    // 读取赛事配置，不存在时创建
    async fn get_or_create_hackathon_settings(
        &self,
        default_weights: &CriterionWeights,
    ) -> Result<HackathonSettings>;
    // 更新赛事配置
    async fn update_hackathon_settings(
        &self,
        patch: HackathonSettingsPatch,
        default_weights: &CriterionWeights,
        user_id: i64,
    ) -> Result<HackathonSettings>;

    /// 项目管理方法
    // 为队伍创建项目
    async fn create_project(
        &self,
        team_id: i64,
        created_by: i64,
        project: CreateProjectRequest,
    ) -> Result<Project>;
    // 通过ID获取项目
    async fn get_project_by_id(&self, project_id: i64) -> Result<Option<Project>>;
    // 获取队伍的项目
    async fn get_project_by_team(&self, team_id: i64) -> Result<Option<Project>>;
    // 更新项目信息
    async fn update_project(
        &self,
        project_id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>>;
    // 提交项目（draft -> submitted）
    async fn submit_project(&self, project_id: i64) -> Result<Option<Project>>;
    // 结束评审（under_review -> reviewed）
    async fn finalize_project(&self, project_id: i64) -> Result<Option<Project>>;
    // 删除项目
    async fn delete_project(&self, project_id: i64) -> Result<bool>;
    // 列出项目
    async fn list_projects_with_pagination(
        &self,
        query: ProjectListQuery,
    ) -> Result<ProjectListResponse>;
    // 排行榜
    async fn list_leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardEntry>>;
    // 评委可评审的项目
    async fn list_judgeable_projects(
        &self,
        judge_id: i64,
        query: JudgeProjectQuery,
    ) -> Result<Vec<JudgeProjectItem>>;
    // 统计处于指定状态的项目数
    async fn count_projects_in_statuses(&self, statuses: &[SubmissionStatus]) -> Result<u64>;
    // 按状态统计项目数量
    async fn count_projects_by_status(&self) -> Result<Vec<LabelCount>>;
    // 导出项目
    async fn list_projects_for_export(&self, limit: u64) -> Result<Vec<Project>>;

    /// 评审方法
    // 创建评审并累加项目得分（单事务）
    async fn create_evaluation(
        &self,
        project_id: i64,
        judge_id: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome>;
    // 修改评审并按差值调整项目得分（单事务，乐观锁）
    async fn update_evaluation(
        &self,
        evaluation_id: i64,
        expected_version: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome>;
    // 通过ID获取评审
    async fn get_evaluation_by_id(&self, evaluation_id: i64) -> Result<Option<Evaluation>>;
    // 获取评委对项目的评审
    async fn get_evaluation_by_project_and_judge(
        &self,
        project_id: i64,
        judge_id: i64,
    ) -> Result<Option<Evaluation>>;
    // 列出项目的评审
    async fn list_evaluations_by_project(&self, project_id: i64) -> Result<Vec<Evaluation>>;
    // 列出评委的评审
    async fn list_evaluations_by_judge(&self, judge_id: i64) -> Result<Vec<JudgeEvaluationItem>>;
    // 导出评审
    async fn list_evaluations_for_export(&self, limit: u64) -> Result<Vec<Evaluation>>;
    // 统计评委的评审数
    async fn count_evaluations_by_judge(&self, judge_id: i64) -> Result<u64>;
    // 统计评审总数
    async fn count_evaluations(&self, complete_only: bool) -> Result<u64>;
    // 从评审记录计算项目得分（只读）
    async fn compute_project_score(&self, project_id: i64) -> Result<ProjectScore>;
    // 从评审记录重建项目得分，返回 (重建前, 重建后)
    async fn recalculate_project_score(
        &self,
        project_id: i64,
    ) -> Result<(ProjectScore, ProjectScore)>;

    /// 附件方法
    // 记录项目附件
    async fn create_project_file(&self, file: NewProjectFile) -> Result<ProjectFile>;
    // 列出项目附件
    async fn list_project_files(&self, project_id: i64) -> Result<Vec<ProjectFile>>;

    /// 通知方法
    // 创建通知
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    // 列出用户通知
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    // 未读通知数量
    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64>;
    // 标记通知已读
    async fn mark_notification_as_read(&self, notification_id: i64, user_id: i64)
    -> Result<bool>;
    // 标记全部通知已读
    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
