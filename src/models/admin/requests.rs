use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::{UserRole, UserStatus};

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/admin.ts")]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/admin.ts")]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}
