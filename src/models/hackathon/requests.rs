use serde::Deserialize;
use ts_rs::TS;

use crate::config::CriterionWeights;
use crate::errors::{HackflowError, Result};
use crate::models::teams::entities::{MAX_TEAM_SIZE, MIN_TEAM_SIZE};

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

// 更新赛事配置请求，日期为 RFC 3339 字符串
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/hackathon.ts")]
pub struct UpdateHackathonRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub theme: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub submission_deadline: Option<String>,
    pub judging_start_date: Option<String>,
    pub judging_end_date: Option<String>,
    pub max_team_size: Option<i64>,
    #[ts(type = "{ innovation: number, technical: number, implementation: number, impact: number } | null")]
    pub judging_weights: Option<CriterionWeights>,
    pub allow_late_submissions: Option<bool>,
    pub enable_leaderboard: Option<bool>,
}

// 校验后的配置变更（日期为 Unix 秒）
#[derive(Debug, Clone, Default)]
pub struct HackathonSettingsPatch {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub theme: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub submission_deadline: Option<i64>,
    pub judging_start_date: Option<i64>,
    pub judging_end_date: Option<i64>,
    pub max_team_size: Option<i64>,
    pub judging_weights: Option<CriterionWeights>,
    pub allow_late_submissions: Option<bool>,
    pub enable_leaderboard: Option<bool>,
}

fn parse_date(raw: Option<String>) -> Result<Option<i64>> {
    match raw {
        Some(value) => Ok(Some(
            chrono::DateTime::parse_from_rfc3339(value.trim())?.timestamp(),
        )),
        None => Ok(None),
    }
}

fn check_order(start: Option<i64>, end: Option<i64>, what: &str) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(HackflowError::validation(format!(
            "{what} start must not be after its end"
        )));
    }
    Ok(())
}

/// 四项权重均在 0 到 100 之间且总和为 100
pub fn validate_weights(weights: &CriterionWeights) -> Result<()> {
    let all = [
        weights.innovation,
        weights.technical,
        weights.implementation,
        weights.impact,
    ];
    if all.iter().any(|w| !(0.0..=100.0).contains(w)) {
        return Err(HackflowError::validation(
            "Each judging weight must be between 0 and 100",
        ));
    }
    if (weights.sum() - 100.0).abs() > 1e-6 {
        return Err(HackflowError::validation(format!(
            "Judging weights must sum to 100, got {}",
            weights.sum()
        )));
    }
    Ok(())
}

impl UpdateHackathonRequest {
    pub fn into_patch(self) -> Result<HackathonSettingsPatch> {
        if let Some(name) = &self.name {
            let len = name.trim().chars().count();
            if len == 0 || len > NAME_MAX_CHARS {
                return Err(HackflowError::validation(format!(
                    "Name must be between 1 and {NAME_MAX_CHARS} characters"
                )));
            }
        }
        if let Some(description) = &self.description
            && description.chars().count() > DESCRIPTION_MAX_CHARS
        {
            return Err(HackflowError::validation(format!(
                "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters"
            )));
        }
        if let Some(size) = self.max_team_size
            && !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&size)
        {
            return Err(HackflowError::validation(format!(
                "Team size must be between {MIN_TEAM_SIZE} and {MAX_TEAM_SIZE}"
            )));
        }
        if let Some(weights) = &self.judging_weights {
            validate_weights(weights)?;
        }

        let patch = HackathonSettingsPatch {
            name: self.name.map(|n| n.trim().to_string()),
            tagline: self.tagline,
            theme: self.theme,
            description: self.description,
            start_date: parse_date(self.start_date)?,
            end_date: parse_date(self.end_date)?,
            submission_deadline: parse_date(self.submission_deadline)?,
            judging_start_date: parse_date(self.judging_start_date)?,
            judging_end_date: parse_date(self.judging_end_date)?,
            max_team_size: self.max_team_size,
            judging_weights: self.judging_weights,
            allow_late_submissions: self.allow_late_submissions,
            enable_leaderboard: self.enable_leaderboard,
        };

        check_order(patch.start_date, patch.end_date, "Hackathon")?;
        check_order(
            patch.judging_start_date,
            patch.judging_end_date,
            "Judging period",
        )?;

        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_are_parsed() {
        let patch = UpdateHackathonRequest {
            submission_deadline: Some("2025-03-03T23:59:59Z".to_string()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.submission_deadline, Some(1_741_046_399));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let err = UpdateHackathonRequest {
            start_date: Some("March 1st".to_string()),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert!(matches!(err, HackflowError::DateParse(_)));
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let err = UpdateHackathonRequest {
            judging_start_date: Some("2025-03-05T00:00:00Z".to_string()),
            judging_end_date: Some("2025-03-04T00:00:00Z".to_string()),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert!(matches!(err, HackflowError::Validation(_)));
    }

    #[test]
    fn test_weights_must_sum_to_hundred() {
        let mut weights = CriterionWeights::default();
        assert!(validate_weights(&weights).is_ok());
        weights.impact = 30.0;
        assert!(validate_weights(&weights).is_err());
        weights = CriterionWeights {
            innovation: 110.0,
            technical: -10.0,
            implementation: 0.0,
            impact: 0.0,
        };
        assert!(validate_weights(&weights).is_err());
    }

    #[test]
    fn test_team_size_bounds() {
        let req = UpdateHackathonRequest {
            max_team_size: Some(MAX_TEAM_SIZE + 1),
            ..Default::default()
        };
        assert!(req.into_patch().is_err());
    }
}
