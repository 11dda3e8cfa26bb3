//! 数据模型定义
//!
//! API 请求/响应结构与业务实体，全部通过 ts-rs 导出到前端类型定义。

pub mod admin;
pub mod auth;
pub mod categories;
pub mod common;
pub mod evaluations;
pub mod files;
pub mod hackathon;
pub mod judge;
pub mod notifications;
pub mod projects;
pub mod teams;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

use serde::Serialize;

/// 应用启动时间
#[derive(Debug, Clone, Serialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 按模块分段：通用 1xxx，认证 2xxx，用户 3xxx，文件 4xxx，
/// 项目 5xxx，评审 6xxx，通知 7xxx，队伍 8xxx，赛道 9xxx。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    ValidationFailed = 1006,
    Conflict = 1009,
    RateLimitExceeded = 1029,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,

    // 用户
    UserNotFound = 3000,
    UserNameInvalid = 3001,
    UserEmailInvalid = 3002,
    UserPasswordInvalid = 3003,
    UserNameAlreadyExists = 3004,
    UserEmailAlreadyExists = 3005,
    UserUpdateFailed = 3006,
    UserRoleInvalid = 3007,

    // 文件
    FileNotFound = 4000,
    FileUploadFailed = 4001,
    FileTypeNotAllowed = 4002,
    FileSizeExceeded = 4003,
    MultifileUploadNotAllowed = 4004,

    // 项目
    ProjectNotFound = 5000,
    ProjectAlreadyExists = 5001,
    ProjectNotEditable = 5002,
    ProjectAlreadySubmitted = 5003,
    ProjectCreateFailed = 5004,
    ProjectUpdateFailed = 5005,
    ProjectDeleteFailed = 5006,
    ProjectNotEvaluable = 5007,
    SubmissionDeadlinePassed = 5008,

    // 评审
    EvaluationNotFound = 6000,
    EvaluationAlreadyExists = 6001,
    EvaluationInvalid = 6002,
    EvaluationConflict = 6003,
    EvaluationFailed = 6004,

    // 通知
    NotificationNotFound = 7000,

    // 队伍
    TeamNotFound = 8000,
    TeamAlreadyJoined = 8001,
    TeamFull = 8002,
    TeamInviteInvalid = 8003,
    TeamLeaderRequired = 8004,
    TeamLeaderCannotLeave = 8005,
    TeamNameAlreadyExists = 8006,
    TeamRequired = 8007,
    TeamOperationFailed = 8008,

    // 赛道
    CategoryNotFound = 9000,
    CategoryAlreadyExists = 9001,
    CategoryInUse = 9002,
}
