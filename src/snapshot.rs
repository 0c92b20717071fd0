use std::path::Path;

use tracing::{debug, warn};

use crate::error::LoadError;
use crate::models::Student;
use crate::timewindow::parse_instant;

/// Loads a locally cached cohort. Question counts must be non-negative or
/// the whole snapshot is rejected.
pub fn load(path: &Path) -> Result<Vec<Student>, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let students = parse(&raw).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(count = students.len(), path = %path.display(), "loaded snapshot");
    Ok(students)
}

pub fn parse(raw: &str) -> Result<Vec<Student>, serde_json::Error> {
    let students: Vec<Student> = serde_json::from_str(raw)?;
    for student in &students {
        warn_unparseable_dates(student);
    }
    Ok(students)
}

/// Unparseable dates are kept; the engine treats them as absent.
fn warn_unparseable_dates(student: &Student) {
    if let Some(last_active) = student.last_active.as_deref() {
        if parse_instant(last_active).is_none() {
            warn!(
                student = %student.name,
                value = last_active,
                "unparseable lastActive, treating as never logged in"
            );
        }
    }
    let dates = student
        .assignments
        .iter()
        .map(|assignment| assignment.due_date.as_str())
        .chain(student.daily_logs.iter().map(|log| log.date.as_str()))
        .chain(student.trial_exams.iter().map(|exam| exam.date.as_str()));
    for date in dates {
        if parse_instant(date).is_none() {
            warn!(
                student = %student.name,
                value = date,
                "unparseable date, record ignored by time windows"
            );
        }
    }
}

pub fn write(path: &Path, students: &[Student]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(students)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {
            "id": "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2",
            "name": "Elif Kaya",
            "lastActive": "2026-03-08T09:15:00Z",
            "assignments": [
                { "title": "Paragraf testi", "dueDate": "2026-03-05", "isCompleted": false }
            ],
            "dailyLogs": [
                { "date": "2026-03-09", "subject": "Matematik", "questionsSolved": 45 }
            ],
            "trialExams": [
                { "examType": "TYT", "date": "2026-03-01", "net": 82.5 }
            ]
        },
        {
            "id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "name": "Mert Demir"
        }
    ]"#;

    #[test]
    fn parses_camel_case_snapshot() {
        let students = parse(SNAPSHOT).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].daily_logs[0].questions_solved, 45);
        assert!(!students[0].assignments[0].is_completed);
        assert_eq!(students[0].trial_exams[0].net, 82.5);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let students = parse(SNAPSHOT).unwrap();
        let mert = &students[1];
        assert!(mert.last_active.is_none());
        assert!(mert.assignments.is_empty());
        assert!(mert.daily_logs.is_empty());
    }

    #[test]
    fn rejects_negative_question_counts() {
        let raw = r#"[{
            "id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "name": "Mert Demir",
            "dailyLogs": [{ "date": "2026-03-09", "subject": "Fizik", "questionsSolved": -4 }]
        }]"#;
        assert!(parse(raw).is_err());
    }

    #[test]
    fn keeps_students_with_unparseable_dates() {
        let raw = r#"[{
            "id": "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "name": "Mert Demir",
            "lastActive": "dün akşam"
        }]"#;
        let students = parse(raw).unwrap();
        assert_eq!(students[0].last_active.as_deref(), Some("dün akşam"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load(Path::new("/nonexistent/cohort.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
