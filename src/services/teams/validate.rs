//! 队伍字段校验

use crate::models::teams::entities::MIN_TEAM_SIZE;
use crate::models::teams::requests::{CreateTeamRequest, UpdateTeamRequest};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const MAX_SKILLS: usize = 10;

fn check_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(format!(
            "Team name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), String> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(format!(
            "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

/// `size_limit` 为赛事配置的队伍人数上限
fn check_max_members(max_members: i64, size_limit: i64) -> Result<(), String> {
    if !(MIN_TEAM_SIZE..=size_limit).contains(&max_members) {
        return Err(format!(
            "Team size must be between {MIN_TEAM_SIZE} and {size_limit}"
        ));
    }
    Ok(())
}

fn check_skills(skills: &[String]) -> Result<(), String> {
    if skills.len() > MAX_SKILLS {
        return Err(format!("At most {MAX_SKILLS} required skills are allowed"));
    }
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err("Required skills cannot be blank".to_string());
    }
    Ok(())
}

pub fn validate_create(req: &CreateTeamRequest, size_limit: i64) -> Result<(), String> {
    check_name(&req.name)?;
    if req.category.trim().is_empty() {
        return Err("Category is required".to_string());
    }
    if let Some(ref description) = req.description {
        check_description(description)?;
    }
    if let Some(max_members) = req.max_members {
        check_max_members(max_members, size_limit)?;
    }
    check_skills(&req.required_skills)
}

pub fn validate_update(req: &UpdateTeamRequest, size_limit: i64) -> Result<(), String> {
    if let Some(ref name) = req.name {
        check_name(name)?;
    }
    if let Some(ref description) = req.description {
        check_description(description)?;
    }
    if let Some(max_members) = req.max_members {
        check_max_members(max_members, size_limit)?;
    }
    if let Some(ref skills) = req.required_skills {
        check_skills(skills)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, max_members: Option<i64>) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            category: "web".to_string(),
            description: None,
            max_members,
            required_skills: vec![],
        }
    }

    #[test]
    fn test_team_size_follows_hackathon_limit() {
        assert!(validate_create(&create("Crabs", Some(4)), 4).is_ok());
        assert!(validate_create(&create("Crabs", Some(5)), 4).is_err());
        assert!(validate_create(&create("Crabs", Some(0)), 4).is_err());
        assert!(validate_create(&create("Crabs", None), 2).is_ok());
    }

    #[test]
    fn test_name_and_skills() {
        assert!(validate_create(&create("ab", None), 4).is_err());
        assert!(validate_create(&create(&"x".repeat(51), None), 4).is_err());

        let update = UpdateTeamRequest {
            required_skills: Some(vec!["rust".to_string(), " ".to_string()]),
            ..Default::default()
        };
        assert!(validate_update(&update, 4).is_err());
        assert!(validate_update(&UpdateTeamRequest::default(), 4).is_ok());
    }
}
