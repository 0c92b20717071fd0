use chrono::{DateTime, Utc};

use crate::models::{Assignment, DailyLog, Student, TrialExam};
use crate::timewindow::{
    date_within_previous_window, date_within_trailing_window, days_since, parse_day,
    parse_instant,
};

pub const WEEK_DAYS: i64 = 7;

/// Rounds half toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn passive_days(student: &Student, now: DateTime<Utc>) -> i64 {
    days_since(student.last_active.as_deref(), now)
}

/// Incomplete assignments whose due day is strictly before today.
pub fn overdue_count(assignments: &[Assignment], now: DateTime<Utc>) -> usize {
    let today = now.date_naive();
    assignments
        .iter()
        .filter(|assignment| !assignment.is_completed)
        .filter(|assignment| parse_day(&assignment.due_date).is_some_and(|due| due < today))
        .count()
}

/// Number of log entries (not questions) in the trailing week.
pub fn last_7_days_activity(logs: &[DailyLog], now: DateTime<Utc>) -> usize {
    logs.iter()
        .filter(|log| date_within_trailing_window(&log.date, WEEK_DAYS, now))
        .count()
}

pub fn weekly_completion_rate(assignments: &[Assignment], now: DateTime<Utc>) -> i64 {
    let due_this_week: Vec<&Assignment> = assignments
        .iter()
        .filter(|assignment| date_within_trailing_window(&assignment.due_date, WEEK_DAYS, now))
        .collect();

    if due_this_week.is_empty() {
        return 100;
    }

    let completed = due_this_week
        .iter()
        .filter(|assignment| assignment.is_completed)
        .count();
    round_half_up(completed as f64 / due_this_week.len() as f64 * 100.0) as i64
}

pub fn trailing_questions(logs: &[DailyLog], window_days: i64, now: DateTime<Utc>) -> u64 {
    logs.iter()
        .filter(|log| date_within_trailing_window(&log.date, window_days, now))
        .map(|log| u64::from(log.questions_solved))
        .sum()
}

fn previous_week_questions(logs: &[DailyLog], now: DateTime<Utc>) -> u64 {
    logs.iter()
        .filter(|log| date_within_previous_window(&log.date, WEEK_DAYS, now))
        .map(|log| u64::from(log.questions_solved))
        .sum()
}

/// Week-over-week change in solved questions, as a signed whole percentage.
pub fn weekly_change(logs: &[DailyLog], now: DateTime<Utc>) -> i64 {
    let this_week = trailing_questions(logs, WEEK_DAYS, now);
    let last_week = previous_week_questions(logs, now);

    if last_week == 0 {
        return if this_week > 0 { 100 } else { 0 };
    }

    let ratio = (this_week as f64 - last_week as f64) / last_week as f64;
    round_half_up(ratio * 100.0) as i64
}

/// Most recent mock exam with a parseable date.
pub fn latest_trial_exam(student: &Student) -> Option<&TrialExam> {
    student
        .trial_exams
        .iter()
        .filter_map(|exam| parse_instant(&exam.date).map(|taken| (taken, exam)))
        .max_by_key(|(taken, _)| *taken)
        .map(|(_, exam)| exam)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    fn day(days_ago: i64) -> String {
        (now().date_naive() - Duration::days(days_ago)).to_string()
    }

    fn assignment(days_ago: i64, is_completed: bool) -> Assignment {
        Assignment {
            title: None,
            due_date: day(days_ago),
            is_completed,
        }
    }

    fn log(days_ago: i64, questions_solved: u32) -> DailyLog {
        DailyLog {
            date: day(days_ago),
            subject: "Matematik".to_string(),
            questions_solved,
        }
    }

    fn student(last_active: Option<&str>) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: "Elif Kaya".to_string(),
            assignments: Vec::new(),
            daily_logs: Vec::new(),
            trial_exams: Vec::new(),
            last_active: last_active.map(str::to_string),
        }
    }

    #[test]
    fn passive_days_defaults_to_thirty_without_login() {
        assert_eq!(passive_days(&student(None), now()), 30);
        assert_eq!(passive_days(&student(Some("2026-03-07T10:00:00Z")), now()), 3);
    }

    #[test]
    fn overdue_requires_incomplete_and_past_due_day() {
        let assignments = vec![
            assignment(0, false),
            assignment(1, false),
            assignment(5, true),
            assignment(20, false),
            assignment(-2, false),
            Assignment {
                title: None,
                due_date: "soon".to_string(),
                is_completed: false,
            },
        ];
        assert_eq!(overdue_count(&assignments, now()), 2);
    }

    #[test]
    fn activity_counts_entries_not_questions() {
        let logs = vec![log(0, 40), log(3, 0), log(6, 12), log(7, 50), log(-1, 10)];
        assert_eq!(last_7_days_activity(&logs, now()), 3);
    }

    #[test]
    fn completion_rate_is_full_without_homework_this_week() {
        assert_eq!(weekly_completion_rate(&[], now()), 100);
        let old = vec![assignment(10, false), assignment(30, false)];
        assert_eq!(weekly_completion_rate(&old, now()), 100);
    }

    #[test]
    fn completion_rate_rounds_to_whole_percent() {
        let assignments = vec![
            assignment(1, true),
            assignment(2, false),
            assignment(3, false),
            assignment(12, true),
        ];
        assert_eq!(weekly_completion_rate(&assignments, now()), 33);

        let two_of_three = vec![assignment(1, true), assignment(2, true), assignment(3, false)];
        assert_eq!(weekly_completion_rate(&two_of_three, now()), 67);
    }

    #[test]
    fn weekly_change_handles_empty_previous_week() {
        assert_eq!(weekly_change(&[], now()), 0);
        assert_eq!(weekly_change(&[log(2, 30)], now()), 100);
        assert_eq!(weekly_change(&[log(2, 0), log(9, 0)], now()), 0);
    }

    #[test]
    fn weekly_change_compares_against_previous_week() {
        let logs = vec![log(1, 40), log(2, 40), log(8, 100)];
        assert_eq!(weekly_change(&logs, now()), -20);

        let growth = vec![log(0, 150), log(13, 100)];
        assert_eq!(weekly_change(&growth, now()), 50);

        let stopped = vec![log(9, 80)];
        assert_eq!(weekly_change(&stopped, now()), -100);

        let older = vec![log(14, 80), log(1, 10)];
        assert_eq!(weekly_change(&older, now()), 100);
    }

    #[test]
    fn weekly_change_rounds_half_up() {
        // (7 - 8) / 8 = -12.5%
        let logs = vec![log(1, 7), log(8, 8)];
        assert_eq!(weekly_change(&logs, now()), -12);
        assert_eq!(round_half_up(2.5), 3.0);
    }

    #[test]
    fn latest_trial_exam_skips_unparseable_dates() {
        let mut s = student(None);
        s.trial_exams = vec![
            TrialExam {
                exam_type: "TYT".to_string(),
                date: day(20),
                net: 71.5,
            },
            TrialExam {
                exam_type: "AYT".to_string(),
                date: day(4),
                net: 48.25,
            },
            TrialExam {
                exam_type: "TYT".to_string(),
                date: "??".to_string(),
                net: 90.0,
            },
        ];
        let latest = latest_trial_exam(&s).unwrap();
        assert_eq!(latest.exam_type, "AYT");
        assert!(latest_trial_exam(&student(None)).is_none());
    }
}
