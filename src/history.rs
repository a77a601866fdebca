//! Calendar and heatmap aggregation
//!
//! Buckets daily risk records into calendar-month tiles and ISO-week rows
//! for the 12-week heatmap. Missing days always surface as `NoData` tiles,
//! never interpolated. Window navigation is clamped so no future week or
//! month is ever returned.

use crate::error::EngineError;
use crate::types::{DailyRiskRecord, HeatmapTile};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default span of the weekly heatmap view
pub const DEFAULT_HEATMAP_WEEKS: usize = 12;

/// One ISO week of daily tiles, Monday first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    pub week_start: NaiveDate,
    pub tiles: Vec<HeatmapTile>,
}

/// Buckets risk records into calendar/heatmap views
pub struct HistoryAggregator;

impl HistoryAggregator {
    /// One tile per day in `[from, to]`, `NoData` where no record exists
    pub fn daily_tiles(
        records: &[DailyRiskRecord],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<HeatmapTile> {
        let by_date = index_by_date(records);
        let mut tiles = Vec::new();
        let mut day = from;
        while day <= to {
            tiles.push(HeatmapTile::for_day(day, by_date.get(&day).copied()));
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        tiles
    }

    /// Tiles for every day of a calendar month
    pub fn month_tiles(
        records: &[DailyRiskRecord],
        year: i32,
        month: u32,
    ) -> Result<Vec<HeatmapTile>, EngineError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::DateParseError(format!("invalid month {year}-{month}")))?;
        let last = last_day_of_month(first);
        Ok(Self::daily_tiles(records, first, last))
    }

    /// One row of seven daily tiles per week in the window, oldest first
    pub fn week_rows(records: &[DailyRiskRecord], window: &WeekWindow) -> Vec<WeekRow> {
        let by_date = index_by_date(records);
        window
            .week_starts()
            .map(|monday| {
                let tiles = (0..7)
                    .map(|offset| {
                        let day = monday + Duration::days(offset);
                        HeatmapTile::for_day(day, by_date.get(&day).copied())
                    })
                    .collect();
                WeekRow {
                    week_start: monday,
                    tiles,
                }
            })
            .collect()
    }
}

fn index_by_date(records: &[DailyRiskRecord]) -> BTreeMap<NaiveDate, &DailyRiskRecord> {
    records.iter().map(|r| (r.date, r)).collect()
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    // First of the following month always exists for a valid date
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|d| d.pred_opt().unwrap_or(first))
        .unwrap_or(first)
}

/// Sliding window of ISO weeks ending no later than the week containing
/// "today". Paging forward past the current week is rejected, not wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    /// Monday of the last week in the window
    end_monday: NaiveDate,
    /// Number of weeks in the window
    len_weeks: usize,
    /// Monday of the week containing today; navigation never passes this
    current_monday: NaiveDate,
}

impl WeekWindow {
    /// Last `len_weeks` weeks ending at the week containing `today`
    pub fn ending_at(today: NaiveDate, len_weeks: usize) -> Self {
        let monday = monday_of(today);
        Self {
            end_monday: monday,
            len_weeks: len_weeks.max(1),
            current_monday: monday,
        }
    }

    pub fn len_weeks(&self) -> usize {
        self.len_weeks
    }

    /// Monday of the first week in the window
    pub fn start_monday(&self) -> NaiveDate {
        self.end_monday - Duration::weeks(self.len_weeks as i64 - 1)
    }

    /// Monday of each week in the window, oldest first
    pub fn week_starts(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start_monday();
        (0..self.len_weeks as i64).map(move |i| start + Duration::weeks(i))
    }

    /// Page one week into the past
    pub fn back(&self) -> Self {
        Self {
            end_monday: self.end_monday - Duration::weeks(1),
            ..self.clone()
        }
    }

    /// Page one week forward; `None` once the window already ends at the
    /// current week
    pub fn forward(&self) -> Option<Self> {
        let next = self.end_monday + Duration::weeks(1);
        if next > self.current_monday {
            None
        } else {
            Some(Self {
                end_monday: next,
                ..self.clone()
            })
        }
    }
}

/// Month cursor for the calendar view; navigation past the current month
/// is rejected the same way the week window rejects future weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
    current_year: i32,
    current_month: u32,
}

impl MonthCursor {
    pub fn at(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            current_year: today.year(),
            current_month: today.month(),
        }
    }

    pub fn back(&self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        };
        Self {
            year,
            month,
            ..self.clone()
        }
    }

    /// `None` once the cursor already sits on the current month
    pub fn forward(&self) -> Option<Self> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        if (year, month) > (self.current_year, self.current_month) {
            None
        } else {
            Some(Self {
                year,
                month,
                ..self.clone()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeatmapTier, RiskLevel};
    use pretty_assertions::assert_eq;

    fn record(date: NaiveDate, wellness: f64) -> DailyRiskRecord {
        let risk = 100.0 - wellness;
        DailyRiskRecord {
            date,
            risk_score: risk,
            risk_level: RiskLevel::from_score(risk),
            insights: vec![],
        }
    }

    #[test]
    fn test_month_tiles_cover_every_day() {
        let records = vec![
            record(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 85.0),
            record(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(), 45.0),
        ];
        let tiles = HistoryAggregator::month_tiles(&records, 2024, 2).unwrap();

        // 2024 is a leap year
        assert_eq!(tiles.len(), 29);
        assert_eq!(tiles[0].tier, HeatmapTier::Excellent);
        assert_eq!(tiles[13].tier, HeatmapTier::Fair);
        // Every other day is a distinct "no data" tile, never a numeric tier
        assert_eq!(
            tiles
                .iter()
                .filter(|t| t.tier == HeatmapTier::NoData)
                .count(),
            27
        );
    }

    #[test]
    fn test_month_tiles_rejects_invalid_month() {
        assert!(HistoryAggregator::month_tiles(&[], 2024, 13).is_err());
    }

    #[test]
    fn test_week_window_never_includes_future_weeks() {
        // 2024-03-13 is a Wednesday; its week starts Monday 2024-03-11
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let window = WeekWindow::ending_at(today, 12);

        let last_start = window.week_starts().last().unwrap();
        assert_eq!(last_start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(window.week_starts().count(), 12);

        // Forward navigation past the current week is rejected
        assert!(window.forward().is_none());
    }

    #[test]
    fn test_week_window_back_then_forward() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let window = WeekWindow::ending_at(today, 4);
        let paged = window.back().back();
        let restored = paged.forward().unwrap().forward().unwrap();
        assert_eq!(restored, window);
        assert!(restored.forward().is_none());
    }

    #[test]
    fn test_week_rows_shape_and_no_data() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let records = vec![record(today, 75.0)];
        let window = WeekWindow::ending_at(today, 2);
        let rows = HistoryAggregator::week_rows(&records, &window);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.tiles.len() == 7));

        // The lone record lands on Wednesday of the last week
        assert_eq!(rows[1].tiles[2].tier, HeatmapTier::Good);
        assert_eq!(rows[0].tiles[2].tier, HeatmapTier::NoData);
    }

    #[test]
    fn test_month_cursor_clamps_at_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let cursor = MonthCursor::at(today);
        assert!(cursor.forward().is_none());

        let january = cursor.back().back();
        assert_eq!((january.year, january.month), (2024, 1));
        let back_to_march = january.forward().unwrap().forward().unwrap();
        assert_eq!((back_to_march.year, back_to_march.month), (2024, 3));
    }

    #[test]
    fn test_month_cursor_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let december = MonthCursor::at(today).back();
        assert_eq!((december.year, december.month), (2023, 12));
    }
}
