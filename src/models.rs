use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
    #[serde(default)]
    pub trial_exams: Vec<TrialExam>,
    /// ISO-8601 date-time of the last login. `None` means the student never logged in.
    #[serde(default)]
    pub last_active: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default)]
    pub title: Option<String>,
    pub due_date: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: String,
    pub subject: String,
    pub questions_solved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialExam {
    pub exam_type: String,
    pub date: String,
    pub net: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Normal,
    Dikkat,
    Kritik,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Normal => "Normal",
            RiskLabel::Dikkat => "Dikkat",
            RiskLabel::Kritik => "Kritik",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLabel::Normal => "#22C55E",
            RiskLabel::Dikkat => "#F59E0B",
            RiskLabel::Kritik => "#EF4444",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInfo {
    pub score: f64,
    pub label: RiskLabel,
    pub color: &'static str,
    pub passive_days: i64,
    pub overdue_count: usize,
    pub weekly_completion_rate: i64,
    pub weekly_change: i64,
    pub last_7_days_activity: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStudent<'a> {
    pub student: &'a Student,
    pub risk: RiskInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub student_count: usize,
    pub critical_count: usize,
    pub at_risk_count: usize,
    pub total_overdue: usize,
    pub most_active: Option<String>,
}
