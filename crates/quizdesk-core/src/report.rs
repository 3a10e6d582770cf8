//! Scenario run reports with JSON persistence and markdown rendering.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::grading::LetterGrade;

/// A complete scenario run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the scenario.
    pub scenario: ScenarioSummary,
    /// One outcome per scenario step, in order.
    pub steps: Vec<StepOutcome>,
    /// Final state of every quiz the scenario created.
    pub quizzes: Vec<QuizSummary>,
    /// Course grades computed by `total` steps.
    pub course_grades: Vec<CourseGradeRow>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a scenario (without the full step definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub step_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Succeeded, or failed with the expected error kind.
    Passed,
    /// Failed unexpectedly, or succeeded when an error was expected.
    Failed,
    /// Not run because an earlier step failed.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Passed => write!(f, "passed"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of one scenario step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// 1-based step number.
    pub step: usize,
    /// Action name (e.g. "enroll").
    pub action: String,
    /// Human-readable description of the step.
    pub description: String,
    pub status: StepStatus,
    /// Error kind the scenario expected, if any.
    #[serde(default)]
    pub expected_error: Option<ErrorKind>,
    /// Error kind the step actually raised, if any.
    #[serde(default)]
    pub error: Option<ErrorKind>,
    /// Error message or explanation of a failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// Final state of one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    /// Scenario key of the quiz.
    pub key: String,
    pub name: String,
    pub code: String,
    /// Scenario key of the owning course.
    pub course: String,
    /// Scenario key of the assigned student.
    #[serde(default)]
    pub student: Option<String>,
    pub submitted: bool,
    pub marked: bool,
    pub teacher_graded: bool,
    pub correct: usize,
    pub total: usize,
    #[serde(default)]
    pub grade: Option<u32>,
}

/// A course letter grade computed for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseGradeRow {
    /// Scenario key of the course.
    pub course: String,
    pub code: String,
    pub semester: u32,
    /// Scenario key of the student.
    pub student: String,
    pub grade: LetterGrade,
}

impl RunReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RunReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Steps that did not pass.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.status == StepStatus::Failed)
    }

    /// Returns true if any step failed.
    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }

    pub fn passed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Passed)
            .count()
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.scenario.name));
        md.push_str(&format!(
            "**Summary:** {} of {} steps passed, {} failed\n\n",
            self.passed_count(),
            self.steps.len(),
            self.failed_steps().count()
        ));

        if !self.quizzes.is_empty() {
            md.push_str("### Quizzes\n\n");
            md.push_str("| Quiz | Course | Student | Submitted | Marked | Correct | Grade |\n");
            md.push_str("|------|--------|---------|-----------|--------|---------|-------|\n");
            for q in &self.quizzes {
                md.push_str(&format!(
                    "| {} ({}) | {} | {} | {} | {} | {}/{} | {} |\n",
                    q.key,
                    q.code,
                    q.course,
                    q.student.as_deref().unwrap_or("-"),
                    yes_no(q.submitted),
                    yes_no(q.marked),
                    q.correct,
                    q.total,
                    q.grade.map(|g| g.to_string()).unwrap_or_else(|| "-".into())
                ));
            }
            md.push('\n');
        }

        if !self.course_grades.is_empty() {
            md.push_str("### Course grades\n\n");
            md.push_str("| Course | Semester | Student | Grade |\n");
            md.push_str("|--------|----------|---------|-------|\n");
            for row in &self.course_grades {
                md.push_str(&format!(
                    "| {} ({}) | {} | {} | {} |\n",
                    row.course, row.code, row.semester, row.student, row.grade
                ));
            }
            md.push('\n');
        }

        if self.has_failures() {
            md.push_str("### Failed steps\n\n");
            for s in self.failed_steps() {
                md.push_str(&format!(
                    "- step {}: {} ({})\n",
                    s.step,
                    s.description,
                    s.message.as_deref().unwrap_or("failed")
                ));
            }
        }

        md
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_report(steps: Vec<StepOutcome>) -> RunReport {
        RunReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            scenario: ScenarioSummary {
                id: "test".into(),
                name: "Test".into(),
                step_count: steps.len(),
            },
            steps,
            quizzes: vec![QuizSummary {
                key: "midterm".into(),
                name: "Mid-term".into(),
                code: "MT-1".into(),
                course: "math".into(),
                student: Some("snow".into()),
                submitted: true,
                marked: true,
                teacher_graded: true,
                correct: 1,
                total: 2,
                grade: Some(50),
            }],
            course_grades: vec![CourseGradeRow {
                course: "math".into(),
                code: "HBZ5".into(),
                semester: 1,
                student: "snow".into(),
                grade: LetterGrade::D,
            }],
            duration_ms: 0,
        }
    }

    fn outcome(step: usize, status: StepStatus) -> StepOutcome {
        StepOutcome {
            step,
            action: "grade".into(),
            description: "grade midterm".into(),
            status,
            expected_error: None,
            error: (status == StepStatus::Failed).then_some(ErrorKind::UnmarkedQuiz),
            message: (status == StepStatus::Failed).then(|| "quiz quiz#0 has not been marked".into()),
        }
    }

    #[test]
    fn counts_failures() {
        let report = make_report(vec![
            outcome(1, StepStatus::Passed),
            outcome(2, StepStatus::Failed),
            outcome(3, StepStatus::Skipped),
        ]);
        assert!(report.has_failures());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_steps().count(), 1);

        let clean = make_report(vec![outcome(1, StepStatus::Passed)]);
        assert!(!clean.has_failures());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![outcome(1, StepStatus::Passed)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = RunReport::load_json(&path).unwrap();

        assert_eq!(loaded.scenario.id, "test");
        assert_eq!(loaded.course_grades[0].grade, LetterGrade::D);
        assert_eq!(loaded.quizzes[0].grade, Some(50));
    }

    #[test]
    fn load_missing_report_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunReport::load_json(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn markdown_output() {
        let report = make_report(vec![
            outcome(1, StepStatus::Passed),
            outcome(2, StepStatus::Failed),
        ]);
        let md = report.to_markdown();
        assert!(md.contains("1 of 2 steps passed"));
        assert!(md.contains("| midterm (MT-1) | math | snow | yes | yes | 1/2 | 50 |"));
        assert!(md.contains("| math (HBZ5) | 1 | snow | D |"));
        assert!(md.contains("Failed steps"));
        assert!(md.contains("has not been marked"));
    }
}
