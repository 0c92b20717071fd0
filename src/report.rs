use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::cohort;
use crate::humanize::{format_passive_days, Locale};
use crate::metrics;
use crate::models::{RankedStudent, Student};

pub fn build_report(students: &[Student], now: DateTime<Utc>, locale: Locale) -> String {
    let summary = cohort::summarize(students, now);
    let ranked = cohort::rank_by_risk(students, now);

    let mut output = String::new();

    let _ = writeln!(output, "# Coach Risk Report");
    let _ = writeln!(output, "Generated at {}", now.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cohort");
    let _ = writeln!(output, "- Students: {}", summary.student_count);
    let _ = writeln!(output, "- Critical: {}", summary.critical_count);
    let _ = writeln!(output, "- At risk today: {}", summary.at_risk_count);
    let _ = writeln!(output, "- Overdue assignments: {}", summary.total_overdue);
    let _ = writeln!(
        output,
        "- Most active this week: {}",
        summary.most_active.as_deref().unwrap_or("-")
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students by Risk");

    if ranked.is_empty() {
        let _ = writeln!(output, "No students in this cohort.");
    } else {
        let _ = writeln!(
            output,
            "| Student | Score | Label | Last seen | Overdue | Weekly completion | Weekly change | Logs (7d) |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
        for entry in ranked.iter() {
            let _ = writeln!(output, "{}", table_row(entry, now, locale));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Latest Mock Exams");

    let mut any_exam = false;
    for student in students {
        if let Some(exam) = metrics::latest_trial_exam(student) {
            any_exam = true;
            let _ = writeln!(
                output,
                "- {}: {} on {} (net {:.2})",
                student.name, exam.exam_type, exam.date, exam.net
            );
        }
    }
    if !any_exam {
        let _ = writeln!(output, "No mock exams recorded.");
    }

    output
}

fn table_row(entry: &RankedStudent<'_>, now: DateTime<Utc>, locale: Locale) -> String {
    let risk = &entry.risk;
    format!(
        "| {} | {:.1} | {} | {} | {} | {}% | {:+}% | {} |",
        entry.student.name,
        risk.score,
        risk.label,
        format_passive_days(entry.student.last_active.as_deref(), now, locale),
        risk.overdue_count,
        risk.weekly_completion_rate,
        risk.weekly_change,
        risk.last_7_days_activity
    )
}
