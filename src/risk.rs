use chrono::{DateTime, Utc};

use crate::metrics::{self, round_half_up};
use crate::models::{RiskInfo, RiskLabel, Student};

pub const PASSIVE_DAY_WEIGHT: f64 = 2.0;
pub const OVERDUE_WEIGHT: f64 = 1.5;
pub const DECLINE_WEIGHT: f64 = 0.1;

/// Scores at or below this are `Normal`.
pub const CAUTION_THRESHOLD: f64 = 5.0;
/// Scores above this are `Kritik`.
pub const CRITICAL_THRESHOLD: f64 = 10.0;

/// Combines the extracted signals into one score, rounded half-up to a tenth.
/// Only a decline in weekly volume adds to the score.
pub fn combine(passive_days: i64, overdue_count: usize, weekly_change: i64) -> f64 {
    let decline = (-weekly_change).max(0) as f64;
    let raw = passive_days as f64 * PASSIVE_DAY_WEIGHT
        + overdue_count as f64 * OVERDUE_WEIGHT
        + decline * DECLINE_WEIGHT;
    round_half_up(raw * 10.0) / 10.0
}

pub fn risk_score(student: &Student, now: DateTime<Utc>) -> f64 {
    combine(
        metrics::passive_days(student, now),
        metrics::overdue_count(&student.assignments, now),
        metrics::weekly_change(&student.daily_logs, now),
    )
}

pub fn risk_label(score: f64) -> RiskLabel {
    if score <= CAUTION_THRESHOLD {
        RiskLabel::Normal
    } else if score <= CRITICAL_THRESHOLD {
        RiskLabel::Dikkat
    } else {
        RiskLabel::Kritik
    }
}

pub fn risk_color(score: f64) -> &'static str {
    risk_label(score).color()
}

pub fn risk_info(student: &Student, now: DateTime<Utc>) -> RiskInfo {
    let passive_days = metrics::passive_days(student, now);
    let overdue_count = metrics::overdue_count(&student.assignments, now);
    let weekly_change = metrics::weekly_change(&student.daily_logs, now);
    let score = combine(passive_days, overdue_count, weekly_change);

    RiskInfo {
        score,
        label: risk_label(score),
        color: risk_color(score),
        passive_days,
        overdue_count,
        weekly_completion_rate: metrics::weekly_completion_rate(&student.assignments, now),
        weekly_change,
        last_7_days_activity: metrics::last_7_days_activity(&student.daily_logs, now),
    }
}
