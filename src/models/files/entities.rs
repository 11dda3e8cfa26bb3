use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub struct ProjectFile {
    pub id: i64,
    pub project_id: i64,
    // 上传时的原始文件名
    pub original_name: String,
    // 磁盘上的文件名
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_name: String,
    // 文件大小（以字节为单位）
    pub file_size: i64,
    // MIME 类型
    pub file_type: String,
    pub uploaded_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 新附件元数据（存储层）
#[derive(Debug, Clone)]
pub struct NewProjectFile {
    pub project_id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: i64,
}
