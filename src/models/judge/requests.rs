use serde::Deserialize;
use ts_rs::TS;

// 评委待评项目查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/judge.ts")]
pub struct JudgeProjectQuery {
    pub category: Option<String>,
    /// true 仅已评，false 仅未评，缺省为全部
    pub evaluated: Option<bool>,
}
