use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::LoadError;
use crate::models::{Assignment, DailyLog, Student, TrialExam};

/// Loads every student with fully populated assignments, logs and mock exams.
pub async fn fetch_students(pool: &PgPool) -> anyhow::Result<Vec<Student>> {
    let rows = sqlx::query(
        "SELECT id, full_name, last_active \
         FROM coach_dashboard.students \
         ORDER BY full_name",
    )
    .fetch_all(pool)
    .await?;

    let mut students = Vec::with_capacity(rows.len());
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let id: Uuid = row.get("id");
        let last_active: Option<DateTime<Utc>> = row.get("last_active");
        index.insert(id, students.len());
        students.push(Student {
            id,
            name: row.get("full_name"),
            assignments: Vec::new(),
            daily_logs: Vec::new(),
            trial_exams: Vec::new(),
            last_active: last_active.map(|instant| instant.to_rfc3339()),
        });
    }

    let assignments = sqlx::query(
        "SELECT student_id, title, due_date, is_completed \
         FROM coach_dashboard.assignments",
    )
    .fetch_all(pool)
    .await?;

    for row in assignments {
        let student_id: Uuid = row.get("student_id");
        let Some(&position) = index.get(&student_id) else {
            continue;
        };
        let due_date: NaiveDate = row.get("due_date");
        students[position].assignments.push(Assignment {
            title: row.get("title"),
            due_date: due_date.to_string(),
            is_completed: row.get("is_completed"),
        });
    }

    let logs = sqlx::query(
        "SELECT student_id, log_date, subject, questions_solved \
         FROM coach_dashboard.daily_logs",
    )
    .fetch_all(pool)
    .await?;

    for row in logs {
        let student_id: Uuid = row.get("student_id");
        let Some(&position) = index.get(&student_id) else {
            continue;
        };
        let log_date: NaiveDate = row.get("log_date");
        let questions: i32 = row.get("questions_solved");
        let questions_solved =
            u32::try_from(questions).map_err(|_| LoadError::NegativeQuestions {
                student: students[position].name.clone(),
                value: questions,
            })?;
        students[position].daily_logs.push(DailyLog {
            date: log_date.to_string(),
            subject: row.get("subject"),
            questions_solved,
        });
    }

    let exams = sqlx::query(
        "SELECT student_id, exam_type, exam_date, net_score \
         FROM coach_dashboard.trial_exams",
    )
    .fetch_all(pool)
    .await?;

    for row in exams {
        let student_id: Uuid = row.get("student_id");
        let Some(&position) = index.get(&student_id) else {
            continue;
        };
        let exam_date: NaiveDate = row.get("exam_date");
        students[position].trial_exams.push(TrialExam {
            exam_type: row.get("exam_type"),
            date: exam_date.to_string(),
            net: row.get("net_score"),
        });
    }

    Ok(students)
}

#[derive(Debug, serde::Deserialize)]
struct LogCsvRow {
    student_id: Uuid,
    log_date: NaiveDate,
    subject: String,
    questions_solved: u32,
    source_key: Option<String>,
}

impl LogCsvRow {
    /// Rows without an explicit key are keyed by student, day and subject,
    /// so one log per subject per day survives repeated imports.
    fn source_key(&self) -> String {
        match self.source_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => format!("{}:{}:{}", self.student_id, self.log_date, self.subject.trim()),
        }
    }
}

fn read_log_rows<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<LogCsvRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in reader.deserialize::<LogCsvRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Imports daily study logs. Rows are keyed by `source_key`, so re-importing
/// the same file inserts nothing new.
pub async fn import_logs_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)?;
    let mut inserted = 0usize;

    for row in read_log_rows(file)? {
        let questions_solved = i32::try_from(row.questions_solved)?;
        let source_key = row.source_key();

        let result = sqlx::query(
            r#"
            INSERT INTO coach_dashboard.daily_logs
            (id, student_id, log_date, subject, questions_solved, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.student_id)
        .bind(row.log_date)
        .bind(&row.subject)
        .bind(questions_solved)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
