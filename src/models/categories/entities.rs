use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 参赛赛道
//
// 队伍与项目通过 slug 引用赛道，slug 创建后不可修改。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/category.ts")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub prize_amount: f64,
    pub max_teams: Option<i64>,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 由名称生成 slug：小写字母数字，其余字符折叠为单个连字符
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("AI & Machine Learning"), "ai-machine-learning");
        assert_eq!(slugify("  Web3  "), "web3");
        assert_eq!(slugify("Health--Tech!"), "health-tech");
        assert_eq!(slugify("智能"), "");
    }
}
