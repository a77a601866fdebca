//! Pattern insights over score history
//!
//! Deterministic rules over recent daily risk records, emitted in rule
//! priority order: declining trend, weekday correlation, then improvement.
//! Each rule is independent; none fires on fewer than two data points, and
//! insufficient history yields an empty sequence rather than a placeholder.
//!
//! Rules reason over the wellness view of the score (higher = better).

use crate::types::DailyRiskRecord;
use chrono::{Datelike, Duration, Weekday};
use std::collections::HashSet;

/// Thresholds for the pattern rules
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Consecutive declining days required for the declining-pattern rule
    pub declining_run_days: usize,
    /// How far below the overall mean a weekday must sit, in points
    pub weekday_gap_points: f64,
    /// Distinct ISO weeks a weekday must be observed in
    pub weekday_min_weeks: usize,
    /// Week-over-week gain required for the improvement rule, in points
    pub improvement_points: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            declining_run_days: 3,
            weekday_gap_points: 10.0,
            weekday_min_weeks: 2,
            improvement_points: 10.0,
        }
    }
}

/// Derives natural-language observations from score history
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }

    /// Run every rule over the given history, newest rules' output first by
    /// rule priority. Records need not arrive sorted.
    pub fn generate(&self, records: &[DailyRiskRecord]) -> Vec<String> {
        if records.len() < 2 {
            return Vec::new();
        }

        let mut sorted: Vec<&DailyRiskRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.date);

        let mut insights = Vec::new();
        if let Some(text) = self.declining_pattern(&sorted) {
            insights.push(text);
        }
        insights.extend(self.weekday_patterns(&sorted));
        if let Some(text) = self.improvement(&sorted) {
            insights.push(text);
        }
        insights
    }

    /// Wellness strictly decreasing across >= N consecutive calendar days
    fn declining_pattern(&self, sorted: &[&DailyRiskRecord]) -> Option<String> {
        let mut longest = 1usize;
        let mut run = 1usize;
        for pair in sorted.windows(2) {
            let consecutive_days = pair[1].date - pair[0].date == Duration::days(1);
            let declining = pair[1].wellness_score() < pair[0].wellness_score();
            if consecutive_days && declining {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 1;
            }
        }

        if longest >= self.config.declining_run_days {
            Some(format!(
                "Your wellness score has declined for {longest} consecutive days."
            ))
        } else {
            None
        }
    }

    /// Weekdays whose average wellness sits well below the overall mean,
    /// observed across enough distinct weeks
    fn weekday_patterns(&self, sorted: &[&DailyRiskRecord]) -> Vec<String> {
        let overall_mean =
            sorted.iter().map(|r| r.wellness_score()).sum::<f64>() / sorted.len() as f64;

        const WEEKDAYS: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];

        let mut insights = Vec::new();
        for weekday in WEEKDAYS {
            let days: Vec<&&DailyRiskRecord> = sorted
                .iter()
                .filter(|r| r.date.weekday() == weekday)
                .collect();
            if days.len() < 2 {
                continue;
            }
            let weeks: HashSet<(i32, u32)> = days
                .iter()
                .map(|r| (r.date.iso_week().year(), r.date.iso_week().week()))
                .collect();
            if weeks.len() < self.config.weekday_min_weeks {
                continue;
            }

            let avg = days.iter().map(|r| r.wellness_score()).sum::<f64>() / days.len() as f64;
            if avg <= overall_mean - self.config.weekday_gap_points {
                insights.push(format!(
                    "You tend to score lower on {}s. Consider planning a lighter day.",
                    weekday_name(weekday)
                ));
            }
        }
        insights
    }

    /// Week-over-week wellness gain of at least the configured points
    fn improvement(&self, sorted: &[&DailyRiskRecord]) -> Option<String> {
        let latest = sorted.last()?.date;
        let week_start = latest - Duration::days(6);
        let prior_start = latest - Duration::days(13);

        let this_week: Vec<f64> = sorted
            .iter()
            .filter(|r| r.date >= week_start)
            .map(|r| r.wellness_score())
            .collect();
        let prior_week: Vec<f64> = sorted
            .iter()
            .filter(|r| r.date >= prior_start && r.date < week_start)
            .map(|r| r.wellness_score())
            .collect();

        if this_week.is_empty() || prior_week.is_empty() {
            return None;
        }

        let this_mean = this_week.iter().sum::<f64>() / this_week.len() as f64;
        let prior_mean = prior_week.iter().sum::<f64>() / prior_week.len() as f64;
        let gain = this_mean - prior_mean;

        if gain >= self.config.improvement_points {
            Some(format!(
                "Your wellness score improved by {gain:.0} points this week. Keep it up."
            ))
        } else {
            None
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
