use chrono::{DateTime, Utc};

use crate::metrics::{self, WEEK_DAYS};
use crate::models::{CohortSummary, RankedStudent, Student};
use crate::risk::{self, CAUTION_THRESHOLD, CRITICAL_THRESHOLD};

/// Students with their risk attached, highest score first. Equal scores keep input order.
pub fn rank_by_risk(students: &[Student], now: DateTime<Utc>) -> Vec<RankedStudent<'_>> {
    let mut ranked: Vec<RankedStudent<'_>> = students
        .iter()
        .map(|student| RankedStudent {
            student,
            risk: risk::risk_info(student, now),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.risk
            .score
            .partial_cmp(&a.risk.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

pub fn count_critical(students: &[Student], now: DateTime<Utc>) -> usize {
    students
        .iter()
        .filter(|student| risk::risk_score(student, now) > CRITICAL_THRESHOLD)
        .count()
}

pub fn count_at_risk_today(students: &[Student], now: DateTime<Utc>) -> usize {
    students
        .iter()
        .filter(|student| risk::risk_score(student, now) > CAUTION_THRESHOLD)
        .count()
}

pub fn total_overdue(students: &[Student], now: DateTime<Utc>) -> usize {
    students
        .iter()
        .map(|student| metrics::overdue_count(&student.assignments, now))
        .sum()
}

/// Name of the student with the most questions solved this week.
/// `None` when the cohort is empty or nobody solved anything.
pub fn most_active_student(students: &[Student], now: DateTime<Utc>) -> Option<&str> {
    let mut best: Option<(&Student, u64)> = None;
    for student in students {
        let volume = metrics::trailing_questions(&student.daily_logs, WEEK_DAYS, now);
        match best {
            Some((_, top)) if volume <= top => {}
            _ => best = Some((student, volume)),
        }
    }

    best.filter(|(_, volume)| *volume > 0)
        .map(|(student, _)| student.name.as_str())
}

pub fn summarize(students: &[Student], now: DateTime<Utc>) -> CohortSummary {
    CohortSummary {
        student_count: students.len(),
        critical_count: count_critical(students, now),
        at_risk_count: count_at_risk_today(students, now),
        total_overdue: total_overdue(students, now),
        most_active: most_active_student(students, now).map(str::to_string),
    }
}
