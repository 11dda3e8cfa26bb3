//! 评审打分与派生字段计算
//!
//! 这里只做纯计算：校验输入、合并权重、派生 `total_score` / `weighted_score`
//! / `is_complete` / `submitted_at`。持久化与项目汇总由存储层在事务内完成。

use crate::config::CriterionWeights;
use crate::models::evaluations::{
    entities::{CriterionScore, Evaluation, EvaluationRecord, Feedback, Recommendation, ScoreSheet},
    requests::{CriterionInput, FeedbackInput, ScoresInput},
    responses::FieldError,
};

pub const MAX_SCORE: f64 = 10.0;
pub const MAX_WEIGHT: f64 = 100.0;
pub const STRENGTHS_MAX_CHARS: usize = 1000;
pub const IMPROVEMENTS_MAX_CHARS: usize = 1000;
pub const GENERAL_COMMENTS_MAX_CHARS: usize = 2000;

const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// (字段名, 展示名)，顺序与 ScoreSheet::criteria 一致
const CRITERIA: [(&str, &str); 4] = [
    ("innovation", "Innovation"),
    ("technical", "Technical"),
    ("implementation", "Implementation"),
    ("impact", "Impact"),
];

/// 派生字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedScores {
    pub total_score: f64,
    pub weighted_score: f64,
    pub is_complete: bool,
}

/// 计算派生分数
///
/// 未打分的维度不计入总分；0 是有效分数，只有缺省才视为未完成。
pub fn derive(sheet: &ScoreSheet) -> DerivedScores {
    let mut total_score = 0.0;
    let mut weighted_score = 0.0;
    let mut is_complete = true;

    for criterion in sheet.criteria() {
        match criterion.score {
            Some(score) => {
                total_score += score;
                weighted_score += score * criterion.weight / MAX_SCORE;
            }
            None => is_complete = false,
        }
    }

    DerivedScores {
        total_score,
        weighted_score,
        is_complete,
    }
}

/// 首次完成时记录提交时间，已有值不覆盖
pub fn stamp_submitted_at(existing: Option<i64>, is_complete: bool, now: i64) -> Option<i64> {
    existing.or(if is_complete { Some(now) } else { None })
}

fn weights_of(sheet: &ScoreSheet) -> [f64; 4] {
    sheet.criteria().map(|c| c.weight)
}

fn default_weights(weights: &CriterionWeights) -> [f64; 4] {
    [
        weights.innovation,
        weights.technical,
        weights.implementation,
        weights.impact,
    ]
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    label: &str,
    value: Option<&String>,
    max: usize,
) {
    if let Some(text) = value
        && text.chars().count() > max
    {
        errors.push(FieldError::new(
            format!("feedback.{field}"),
            format!("{label} must be at most {max} characters"),
        ));
    }
}

// 空白文本视为清除该字段
fn merge_text(input: Option<String>, existing: Option<String>) -> Option<String> {
    match input {
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text),
        None => existing,
    }
}

/// 已通过字段校验的评审输入
#[derive(Debug, Clone)]
pub struct EvaluationPatch {
    scores: [f64; 4],
    weights: [Option<f64>; 4],
    feedback: Option<FeedbackInput>,
    recommendation: Option<Recommendation>,
}

impl EvaluationPatch {
    /// 校验四项分数、可选权重与反馈长度
    pub fn parse(
        scores: &ScoresInput,
        feedback: Option<FeedbackInput>,
        recommendation: Option<Recommendation>,
    ) -> Result<Self, Vec<FieldError>> {
        let inputs: [Option<CriterionInput>; 4] = [
            scores.innovation,
            scores.technical,
            scores.implementation,
            scores.impact,
        ];

        let mut errors = Vec::new();
        let mut parsed_scores = [0.0; 4];
        let mut parsed_weights = [None; 4];

        for (idx, ((field, label), input)) in CRITERIA.iter().zip(inputs).enumerate() {
            let input = input.unwrap_or_default();

            match input.score {
                None => errors.push(FieldError::new(
                    format!("scores.{field}.score"),
                    format!("{label} score is required"),
                )),
                Some(score) if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) => {
                    errors.push(FieldError::new(
                        format!("scores.{field}.score"),
                        format!("{label} score must be between 0 and 10"),
                    ))
                }
                Some(score) => parsed_scores[idx] = score,
            }

            if let Some(weight) = input.weight {
                if !weight.is_finite() || !(0.0..=MAX_WEIGHT).contains(&weight) {
                    errors.push(FieldError::new(
                        format!("scores.{field}.weight"),
                        format!("{label} weight must be between 0 and 100"),
                    ));
                } else {
                    parsed_weights[idx] = Some(weight);
                }
            }
        }

        if let Some(ref fb) = feedback {
            check_length(
                &mut errors,
                "strengths",
                "Strengths",
                fb.strengths.as_ref(),
                STRENGTHS_MAX_CHARS,
            );
            check_length(
                &mut errors,
                "improvements",
                "Improvements",
                fb.improvements.as_ref(),
                IMPROVEMENTS_MAX_CHARS,
            );
            check_length(
                &mut errors,
                "general_comments",
                "General comments",
                fb.general_comments.as_ref(),
                GENERAL_COMMENTS_MAX_CHARS,
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            scores: parsed_scores,
            weights: parsed_weights,
            feedback,
            recommendation,
        })
    }

    /// 生成新评审：缺省权重取配置默认值
    pub fn into_new_record(
        self,
        defaults: &CriterionWeights,
        now: i64,
    ) -> Result<EvaluationRecord, Vec<FieldError>> {
        self.build(
            default_weights(defaults),
            Feedback::default(),
            Recommendation::default(),
            None,
            now,
        )
    }

    /// 合并到已有评审：缺省权重沿用原权重，缺省反馈与推荐意见保持不变
    pub fn merge_into(
        self,
        existing: &Evaluation,
        now: i64,
    ) -> Result<EvaluationRecord, Vec<FieldError>> {
        self.build(
            weights_of(&existing.scores),
            existing.feedback.clone(),
            existing.recommendation.clone(),
            existing.submitted_at.map(|t| t.timestamp()),
            now,
        )
    }

    fn build(
        self,
        base_weights: [f64; 4],
        base_feedback: Feedback,
        base_recommendation: Recommendation,
        previous_submitted_at: Option<i64>,
        now: i64,
    ) -> Result<EvaluationRecord, Vec<FieldError>> {
        let criterion = |idx: usize| {
            CriterionScore::new(
                Some(self.scores[idx]),
                self.weights[idx].unwrap_or(base_weights[idx]),
            )
        };
        let scores = ScoreSheet {
            innovation: criterion(0),
            technical: criterion(1),
            implementation: criterion(2),
            impact: criterion(3),
        };

        let weight_sum: f64 = weights_of(&scores).iter().sum();
        if (weight_sum - MAX_WEIGHT).abs() > WEIGHT_SUM_EPSILON {
            return Err(vec![FieldError::new(
                "scores",
                format!("Criterion weights must sum to 100 (got {weight_sum})"),
            )]);
        }

        let feedback = match self.feedback {
            Some(input) => Feedback {
                strengths: merge_text(input.strengths, base_feedback.strengths),
                improvements: merge_text(input.improvements, base_feedback.improvements),
                general_comments: merge_text(input.general_comments, base_feedback.general_comments),
            },
            None => base_feedback,
        };

        let derived = derive(&scores);

        Ok(EvaluationRecord {
            scores,
            total_score: derived.total_score,
            weighted_score: derived.weighted_score,
            feedback,
            recommendation: self.recommendation.unwrap_or(base_recommendation),
            is_complete: derived.is_complete,
            submitted_at: stamp_submitted_at(previous_submitted_at, derived.is_complete, now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [f64; 4]) -> ScoresInput {
        let input = |score: f64| {
            Some(CriterionInput {
                score: Some(score),
                weight: None,
            })
        };
        ScoresInput {
            innovation: input(values[0]),
            technical: input(values[1]),
            implementation: input(values[2]),
            impact: input(values[3]),
        }
    }

    fn sheet(values: [Option<f64>; 4], weights: [f64; 4]) -> ScoreSheet {
        ScoreSheet {
            innovation: CriterionScore::new(values[0], weights[0]),
            technical: CriterionScore::new(values[1], weights[1]),
            implementation: CriterionScore::new(values[2], weights[2]),
            impact: CriterionScore::new(values[3], weights[3]),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_derive_default_weights() {
        let derived = derive(&sheet(
            [Some(8.0), Some(7.0), Some(9.0), Some(6.0)],
            [25.0; 4],
        ));
        assert!(approx(derived.total_score, 30.0));
        assert!(approx(derived.weighted_score, 75.0));
        assert!(derived.is_complete);

        let uniform = derive(&sheet([Some(6.0); 4], [25.0; 4]));
        assert!(approx(uniform.weighted_score, 60.0));

        let perfect = derive(&sheet([Some(10.0); 4], [25.0; 4]));
        assert!(approx(perfect.weighted_score, 100.0));
    }

    #[test]
    fn test_default_weights_scale_total() {
        // 默认权重下 weighted = total / 40 * 100
        for values in [
            [0.0, 0.0, 0.0, 0.0],
            [1.5, 2.0, 9.5, 10.0],
            [3.0, 7.0, 4.0, 8.0],
            [10.0, 0.0, 10.0, 0.0],
        ] {
            let derived = derive(&sheet(values.map(Some), [25.0; 4]));
            assert!(approx(
                derived.weighted_score,
                derived.total_score / 40.0 * 100.0
            ));
        }
    }

    #[test]
    fn test_derive_custom_weights() {
        let derived = derive(&sheet(
            [Some(10.0), Some(5.0), Some(0.0), Some(8.0)],
            [40.0, 30.0, 20.0, 10.0],
        ));
        // 40 + 15 + 0 + 8
        assert!(approx(derived.weighted_score, 63.0));
        assert!(approx(derived.total_score, 23.0));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let s = sheet([Some(3.3), Some(4.4), Some(5.5), Some(6.6)], [25.0; 4]);
        assert_eq!(derive(&s), derive(&s));
    }

    #[test]
    fn test_zero_counts_as_scored() {
        let derived = derive(&sheet([Some(0.0), Some(5.0), Some(5.0), Some(5.0)], [25.0; 4]));
        assert!(derived.is_complete);

        let partial = derive(&sheet([None, Some(5.0), Some(5.0), Some(5.0)], [25.0; 4]));
        assert!(!partial.is_complete);
        assert!(approx(partial.total_score, 15.0));
    }

    #[test]
    fn test_stamp_submitted_at_never_overwrites() {
        assert_eq!(stamp_submitted_at(None, false, 100), None);
        assert_eq!(stamp_submitted_at(None, true, 100), Some(100));
        assert_eq!(stamp_submitted_at(Some(50), true, 100), Some(50));
        assert_eq!(stamp_submitted_at(Some(50), false, 100), Some(50));
    }

    #[test]
    fn test_parse_rejects_missing_and_out_of_range() {
        let mut input = scores([8.0, 7.0, 9.0, 6.0]);
        input.technical = None;
        input.impact = Some(CriterionInput {
            score: Some(10.5),
            weight: None,
        });

        let errors = EvaluationPatch::parse(&input, None, None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "scores.technical.score");
        assert_eq!(errors[0].message, "Technical score is required");
        assert_eq!(errors[1].field, "scores.impact.score");

        let mut negative = scores([8.0, 7.0, 9.0, 6.0]);
        negative.innovation = Some(CriterionInput {
            score: Some(-0.1),
            weight: None,
        });
        assert!(EvaluationPatch::parse(&negative, None, None).is_err());

        let mut nan = scores([8.0, 7.0, 9.0, 6.0]);
        nan.implementation = Some(CriterionInput {
            score: Some(f64::NAN),
            weight: None,
        });
        assert!(EvaluationPatch::parse(&nan, None, None).is_err());
    }

    #[test]
    fn test_parse_accepts_bounds() {
        assert!(EvaluationPatch::parse(&scores([0.0, 10.0, 0.0, 10.0]), None, None).is_ok());
    }

    #[test]
    fn test_parse_rejects_long_feedback() {
        let feedback = FeedbackInput {
            strengths: Some("s".repeat(STRENGTHS_MAX_CHARS)),
            improvements: Some("i".repeat(IMPROVEMENTS_MAX_CHARS + 1)),
            general_comments: Some("g".repeat(GENERAL_COMMENTS_MAX_CHARS + 1)),
        };
        let errors =
            EvaluationPatch::parse(&scores([5.0; 4]), Some(feedback), None).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["feedback.improvements", "feedback.general_comments"]
        );
    }

    #[test]
    fn test_feedback_length_counts_chars() {
        // 多字节字符按字符计数
        let feedback = FeedbackInput {
            strengths: Some("好".repeat(STRENGTHS_MAX_CHARS)),
            improvements: None,
            general_comments: None,
        };
        assert!(EvaluationPatch::parse(&scores([5.0; 4]), Some(feedback), None).is_ok());
    }

    #[test]
    fn test_new_record_uses_configured_defaults() {
        let patch = EvaluationPatch::parse(&scores([8.0, 7.0, 9.0, 6.0]), None, None).unwrap();
        let record = patch
            .into_new_record(&CriterionWeights::default(), 1_700_000_000)
            .unwrap();

        assert!(approx(record.weighted_score, 75.0));
        assert!(approx(record.total_score, 30.0));
        assert!(record.is_complete);
        assert_eq!(record.submitted_at, Some(1_700_000_000));
        assert_eq!(record.recommendation, Recommendation::Neutral);
        assert_eq!(record.feedback, Feedback::default());

        let skewed = CriterionWeights {
            innovation: 70.0,
            technical: 10.0,
            implementation: 10.0,
            impact: 10.0,
        };
        let patch = EvaluationPatch::parse(&scores([10.0, 0.0, 0.0, 0.0]), None, None).unwrap();
        let record = patch.into_new_record(&skewed, 0).unwrap();
        assert!(approx(record.weighted_score, 70.0));
        assert!(approx(record.scores.innovation.weight, 70.0));
    }

    #[test]
    fn test_weights_must_sum_to_hundred() {
        let mut input = scores([5.0; 4]);
        input.innovation = Some(CriterionInput {
            score: Some(5.0),
            weight: Some(40.0),
        });
        let patch = EvaluationPatch::parse(&input, None, None).unwrap();
        let errors = patch
            .into_new_record(&CriterionWeights::default(), 0)
            .unwrap_err();
        assert_eq!(errors[0].field, "scores");

        let mut balanced = scores([5.0; 4]);
        balanced.innovation = Some(CriterionInput {
            score: Some(5.0),
            weight: Some(40.0),
        });
        balanced.impact = Some(CriterionInput {
            score: Some(5.0),
            weight: Some(10.0),
        });
        let patch = EvaluationPatch::parse(&balanced, None, None).unwrap();
        assert!(
            patch
                .into_new_record(&CriterionWeights::default(), 0)
                .is_ok()
        );
    }

    fn existing_evaluation() -> Evaluation {
        let now = chrono::Utc::now();
        let submitted = chrono::DateTime::<chrono::Utc>::from_timestamp(1_000, 0).unwrap();
        Evaluation {
            id: 1,
            project_id: 1,
            judge_id: 2,
            scores: sheet(
                [Some(8.0), Some(7.0), Some(9.0), Some(6.0)],
                [40.0, 20.0, 20.0, 20.0],
            ),
            total_score: 30.0,
            weighted_score: 76.0,
            feedback: Feedback {
                strengths: Some("clean architecture".to_string()),
                improvements: Some("more tests".to_string()),
                general_comments: None,
            },
            recommendation: Recommendation::Recommend,
            is_complete: true,
            submitted_at: Some(submitted),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_merge_keeps_existing_weights_and_feedback() {
        let existing = existing_evaluation();
        let patch = EvaluationPatch::parse(&scores([10.0; 4]), None, None).unwrap();
        let record = patch.merge_into(&existing, 2_000).unwrap();

        assert!(approx(record.scores.innovation.weight, 40.0));
        assert!(approx(record.weighted_score, 100.0));
        assert_eq!(record.feedback, existing.feedback);
        assert_eq!(record.recommendation, Recommendation::Recommend);
        // 已有提交时间不被覆盖
        assert_eq!(record.submitted_at, Some(1_000));
    }

    #[test]
    fn test_merge_replaces_provided_fields() {
        let existing = existing_evaluation();
        let feedback = FeedbackInput {
            strengths: None,
            improvements: Some("   ".to_string()),
            general_comments: Some("solid demo".to_string()),
        };
        let patch = EvaluationPatch::parse(
            &scores([6.0; 4]),
            Some(feedback),
            Some(Recommendation::HighlyRecommend),
        )
        .unwrap();
        let record = patch.merge_into(&existing, 2_000).unwrap();

        assert_eq!(
            record.feedback.strengths.as_deref(),
            Some("clean architecture")
        );
        assert_eq!(record.feedback.improvements, None);
        assert_eq!(
            record.feedback.general_comments.as_deref(),
            Some("solid demo")
        );
        assert_eq!(record.recommendation, Recommendation::HighlyRecommend);
    }
}
