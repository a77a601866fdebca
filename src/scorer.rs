//! Risk scoring
//!
//! The scorer folds one day's answered questions and behavioral signals
//! into a bounded 0-100 risk score and a categorical level. It is a pure
//! function of its inputs: recomputing on the same frozen inputs always
//! yields the same record, which is what makes out-of-order signal arrival
//! safe to absorb by recomputation.

use crate::error::EngineError;
use crate::types::{BehaviorSignal, Category, DailyRiskRecord, DailyResponse, RiskLevel, SignalKind};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Cap on accumulated penalty points so no run of signals dominates
pub const DEFAULT_PENALTY_CAP: f64 = 3.0;

/// Score points added per penalty point
pub const PENALTY_POINT_VALUE: f64 = 10.0;

/// Response delays shorter than this carry no penalty (seconds)
pub const RESPONSE_DELAY_THRESHOLD_SECS: f64 = 10.0;

/// Scoring configuration
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Rolling-average window applied before classification.
    /// Off by default; smoothing is never applied silently.
    pub smoothing_window: Option<usize>,
    /// Cap on accumulated penalty points
    pub penalty_cap: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            smoothing_window: None,
            penalty_cap: DEFAULT_PENALTY_CAP,
        }
    }
}

/// Penalty weight for one signal kind. Missed check-ins and late-night
/// usage weigh heavier than routine app opens.
fn signal_weight(kind: SignalKind) -> f64 {
    match kind {
        SignalKind::MissedCheckin => 1.5,
        SignalKind::LateNightUsage => 1.0,
        SignalKind::ResponseDelay => 0.5,
        SignalKind::AppOpen => 0.1,
    }
}

/// Normalize a signal's magnitude to 0-1 before weighting
fn normalized_value(kind: SignalKind, value: f64) -> f64 {
    match kind {
        // Delay only penalizes once it crosses the hesitation threshold
        SignalKind::ResponseDelay => {
            if value > RESPONSE_DELAY_THRESHOLD_SECS {
                1.0
            } else {
                0.0
            }
        }
        _ => value.clamp(0.0, 1.0),
    }
}

/// Combines daily responses and behavior signals into a risk record
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: ScorerConfig,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Rolling average over the last K days, enabled explicitly
    pub fn with_smoothing(window: usize) -> Self {
        Self {
            config: ScorerConfig {
                smoothing_window: Some(window),
                ..ScorerConfig::default()
            },
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Per-category response sub-scores.
    ///
    /// `100 - (avg(answer) - 1) / 4 * 100`: answer 1 (best) maps to 100,
    /// answer 5 (worst) to 0. Categories with no answer are excluded, not
    /// defaulted, so unanswered questions cannot move the score.
    pub fn category_sub_scores(responses: &[DailyResponse]) -> BTreeMap<&'static str, f64> {
        let mut buckets: BTreeMap<&'static str, (f64, u32)> = BTreeMap::new();
        for r in responses {
            let entry = buckets.entry(r.category.as_str()).or_insert((0.0, 0));
            entry.0 += r.answer_value as f64;
            entry.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(cat, (sum, n))| {
                let avg = sum / n as f64;
                (cat, 100.0 - (avg - 1.0) / 4.0 * 100.0)
            })
            .collect()
    }

    /// Accumulated penalty points from behavior signals, capped
    fn penalty_points(&self, signals: &[BehaviorSignal]) -> f64 {
        let raw: f64 = signals
            .iter()
            .map(|s| signal_weight(s.kind) * normalized_value(s.kind, s.value))
            .sum();
        raw.min(self.config.penalty_cap)
    }

    /// Compute the day's risk record from frozen inputs.
    ///
    /// Responses reaching the scorer from outside a validated store (e.g.
    /// deserialized straight from caller JSON) are re-checked here: an
    /// answer outside 1..=5 is rejected, never clamped into the score.
    ///
    /// A day with zero answered responses and zero signals has no record;
    /// that absence is an `InsufficientData` error, distinguishable from a
    /// perfect (0) or worst (100) score.
    pub fn score_day(
        &self,
        date: NaiveDate,
        responses: &[DailyResponse],
        signals: &[BehaviorSignal],
        history: &[DailyRiskRecord],
    ) -> Result<DailyRiskRecord, EngineError> {
        if let Some(bad) = responses.iter().find(|r| !(1..=5).contains(&r.answer_value)) {
            return Err(EngineError::InvalidAnswer {
                question_id: bad.question_id.clone(),
                value: bad.answer_value,
            });
        }

        if responses.is_empty() && signals.is_empty() {
            return Err(EngineError::InsufficientData(format!(
                "no responses or signals recorded for {date}"
            )));
        }

        let sub_scores = Self::category_sub_scores(responses);
        let base_risk = if sub_scores.is_empty() {
            0.0
        } else {
            let avg: f64 = sub_scores.values().sum::<f64>() / sub_scores.len() as f64;
            100.0 - avg
        };

        let penalty_points = self.penalty_points(signals);
        let raw_score =
            (base_risk + penalty_points * PENALTY_POINT_VALUE).clamp(0.0, 100.0);

        let risk_score = match self.config.smoothing_window {
            Some(window) if window > 1 => smooth(raw_score, date, history, window),
            _ => raw_score,
        };

        let risk_level = RiskLevel::from_score(risk_score);
        let insights = summary_insights(risk_level, penalty_points, signals);

        Ok(DailyRiskRecord {
            date,
            risk_score,
            risk_level,
            insights,
        })
    }
}

/// Rolling average of today's raw score with up to `window - 1` prior days
fn smooth(raw_score: f64, date: NaiveDate, history: &[DailyRiskRecord], window: usize) -> f64 {
    let mut prior: Vec<&DailyRiskRecord> = history.iter().filter(|r| r.date < date).collect();
    prior.sort_by_key(|r| r.date);

    let tail: Vec<f64> = prior
        .iter()
        .rev()
        .take(window - 1)
        .map(|r| r.risk_score)
        .collect();

    let sum: f64 = raw_score + tail.iter().sum::<f64>();
    sum / (tail.len() + 1) as f64
}

/// Level summary plus a behavior note when late activity weighs in
fn summary_insights(
    level: RiskLevel,
    penalty_points: f64,
    signals: &[BehaviorSignal],
) -> Vec<String> {
    let mut insights = vec![match level {
        RiskLevel::High => "High mental fatigue detected.".to_string(),
        RiskLevel::Medium => "Early signs of stress detected.".to_string(),
        RiskLevel::Low => "Your mental energy seems stable.".to_string(),
    }];

    let has_late_night = signals
        .iter()
        .any(|s| s.kind == SignalKind::LateNightUsage);
    if penalty_points > 2.0 && has_late_night {
        insights.push("Late night activity is impacting your score.".to_string());
    }

    insights
}

/// Convenience for building responses in scoring contexts
pub fn response(question_id: &str, category: Category, answer_value: u8) -> DailyResponse {
    DailyResponse {
        question_id: question_id.to_string(),
        category,
        answer_value,
        recorded_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn signal(kind: SignalKind, value: f64) -> BehaviorSignal {
        BehaviorSignal {
            kind,
            value,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_best_answers_score_near_zero() {
        let scorer = RiskScorer::new();
        let responses = vec![
            response("s1", Category::Sleep, 1),
            response("f1", Category::Focus, 1),
        ];
        let record = scorer.score_day(date(), &responses, &[], &[]).unwrap();
        assert!(record.risk_score < 1.0);
        assert_eq!(record.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_worst_answers_with_missed_checkin_score_near_100() {
        let scorer = RiskScorer::new();
        let responses = vec![
            response("s1", Category::Sleep, 5),
            response("f1", Category::Focus, 5),
        ];
        let signals = vec![signal(SignalKind::MissedCheckin, 1.0)];
        let record = scorer
            .score_day(date(), &responses, &signals, &[])
            .unwrap();
        assert!(record.risk_score > 99.0);
        assert_eq!(record.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_score_bounds_over_answer_grid() {
        let scorer = RiskScorer::new();
        for sleep in 1..=5u8 {
            for focus in 1..=5u8 {
                let responses = vec![
                    response("s1", Category::Sleep, sleep),
                    response("f1", Category::Focus, focus),
                ];
                let record = scorer.score_day(date(), &responses, &[], &[]).unwrap();
                assert!((0.0..=100.0).contains(&record.risk_score));
                assert_eq!(record.risk_level, RiskLevel::from_score(record.risk_score));
            }
        }
    }

    #[test]
    fn test_out_of_range_answer_rejected_not_clamped() {
        let scorer = RiskScorer::new();
        // An answer of 0 would clamp into a "perfect" day and 9 into a
        // worst day; both must be rejected at the scoring boundary.
        for value in [0u8, 6, 9] {
            let responses = vec![response("s1", Category::Sleep, value)];
            let result = scorer.score_day(date(), &responses, &[], &[]);
            assert!(
                matches!(
                    result,
                    Err(EngineError::InvalidAnswer { ref question_id, value: v })
                        if question_id == "s1" && v == value
                ),
                "value {value} was not rejected"
            );
        }
    }

    #[test]
    fn test_empty_day_is_insufficient_data() {
        let scorer = RiskScorer::new();
        let result = scorer.score_day(date(), &[], &[], &[]);
        assert!(matches!(result, Err(EngineError::InsufficientData(_))));
    }

    #[test]
    fn test_signals_alone_produce_a_record() {
        let scorer = RiskScorer::new();
        let signals = vec![
            signal(SignalKind::LateNightUsage, 1.0),
            signal(SignalKind::LateNightUsage, 1.0),
        ];
        let record = scorer.score_day(date(), &[], &signals, &[]).unwrap();
        assert_eq!(record.risk_score, 20.0);
        assert_eq!(record.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_idempotent_on_frozen_inputs() {
        let scorer = RiskScorer::new();
        let responses = vec![
            response("s1", Category::Sleep, 3),
            response("m1", Category::Mood, 4),
        ];
        let signals = vec![signal(SignalKind::ResponseDelay, 15.0)];

        let a = scorer.score_day(date(), &responses, &signals, &[]).unwrap();
        let b = scorer.score_day(date(), &responses, &signals, &[]).unwrap();
        assert_eq!(a.risk_score, b.risk_score);
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.insights, b.insights);
    }

    #[test]
    fn test_unanswered_category_excluded_not_defaulted() {
        let scorer = RiskScorer::new();
        // Only sleep answered, at worst. Mood being unanswered must not
        // dilute the sleep sub-score.
        let responses = vec![response("s1", Category::Sleep, 5)];
        let record = scorer.score_day(date(), &responses, &[], &[]).unwrap();
        assert_eq!(record.risk_score, 100.0);
    }

    #[test]
    fn test_category_sub_score_formula() {
        let responses = vec![
            response("s1", Category::Sleep, 1),
            response("s2", Category::Sleep, 5),
            response("f1", Category::Focus, 3),
        ];
        let subs = RiskScorer::category_sub_scores(&responses);
        // Sleep avg 3 -> 100 - 50 = 50; focus 3 -> 50
        assert_eq!(subs["sleep"], 50.0);
        assert_eq!(subs["focus"], 50.0);
    }

    #[test]
    fn test_penalty_cap_limits_signal_pileup() {
        let scorer = RiskScorer::new();
        let responses = vec![response("s1", Category::Sleep, 1)];
        let signals: Vec<BehaviorSignal> = (0..20)
            .map(|_| signal(SignalKind::LateNightUsage, 1.0))
            .collect();
        let record = scorer
            .score_day(date(), &responses, &signals, &[])
            .unwrap();
        // 20 late-night points capped at 3.0 -> +30 over a base of 0
        assert_eq!(record.risk_score, 30.0);
    }

    #[test]
    fn test_short_response_delay_carries_no_penalty() {
        let scorer = RiskScorer::new();
        let responses = vec![response("s1", Category::Sleep, 1)];
        let quick = vec![signal(SignalKind::ResponseDelay, 3.0)];
        let slow = vec![signal(SignalKind::ResponseDelay, 30.0)];

        let quick_record = scorer.score_day(date(), &responses, &quick, &[]).unwrap();
        let slow_record = scorer.score_day(date(), &responses, &slow, &[]).unwrap();
        assert_eq!(quick_record.risk_score, 0.0);
        assert_eq!(slow_record.risk_score, 5.0);
    }

    #[test]
    fn test_smoothing_is_explicit_and_uses_history() {
        let responses = vec![response("s1", Category::Sleep, 5)]; // raw 100
        let history = vec![
            DailyRiskRecord {
                date: date().pred_opt().unwrap().pred_opt().unwrap(),
                risk_score: 40.0,
                risk_level: RiskLevel::Medium,
                insights: vec![],
            },
            DailyRiskRecord {
                date: date().pred_opt().unwrap(),
                risk_score: 70.0,
                risk_level: RiskLevel::High,
                insights: vec![],
            },
        ];

        let plain = RiskScorer::new()
            .score_day(date(), &responses, &[], &history)
            .unwrap();
        assert_eq!(plain.risk_score, 100.0);

        let smoothed = RiskScorer::with_smoothing(3)
            .score_day(date(), &responses, &[], &history)
            .unwrap();
        // (40 + 70 + 100) / 3
        assert_eq!(smoothed.risk_score, 70.0);
        assert_eq!(smoothed.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_level_summary_insights() {
        let scorer = RiskScorer::new();
        let calm = scorer
            .score_day(date(), &[response("s1", Category::Sleep, 1)], &[], &[])
            .unwrap();
        assert_eq!(calm.insights, vec!["Your mental energy seems stable."]);

        let signals: Vec<BehaviorSignal> = (0..3)
            .map(|_| signal(SignalKind::LateNightUsage, 1.0))
            .collect();
        let strained = scorer
            .score_day(date(), &[response("s1", Category::Sleep, 5)], &signals, &[])
            .unwrap();
        assert_eq!(strained.insights[0], "High mental fatigue detected.");
        assert!(strained
            .insights
            .contains(&"Late night activity is impacting your score.".to_string()));
    }
}
