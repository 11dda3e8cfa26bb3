use serde::Deserialize;
use ts_rs::TS;

// 创建赛道请求，slug 缺省时由名称生成
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub prize_amount: Option<f64>,
    pub max_teams: Option<i64>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}

// 更新赛道请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub prize_amount: Option<f64>,
    pub max_teams: Option<i64>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}
