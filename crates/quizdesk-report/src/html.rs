//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizdesk_core::report::{QuizSummary, RunReport, StepStatus};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a run report.
pub fn generate_html(report: &RunReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizdesk report: {}</title>\n",
        html_escape(&report.scenario.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>quizdesk report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Scenario: <strong>{}</strong> | {} steps | {} passed | {} failed | {}</p>\n",
        html_escape(&report.scenario.name),
        report.scenario.step_count,
        report.passed_count(),
        report.failed_steps().count(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Quizzes and course grades
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Quizzes</h2>\n");
    if report.quizzes.is_empty() {
        html.push_str("<p class=\"meta\">No quizzes were created.</p>\n");
    } else {
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Quiz</th><th>Course</th><th>Student</th><th>Submitted</th><th>Marked</th><th>Correct</th><th>Grade</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for q in &report.quizzes {
            html.push_str(&format!(
                "<tr><td>{} ({})</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td></tr>\n",
                html_escape(&q.name),
                html_escape(&q.code),
                html_escape(&q.course),
                html_escape(q.student.as_deref().unwrap_or("-")),
                yes_no(q.submitted),
                yes_no(q.marked),
                q.correct,
                q.total,
                q.grade.map(|g| format!("{g}%")).unwrap_or_else(|| "-".into()),
            ));
        }
        html.push_str("</tbody></table>\n");

        // SVG bar chart for graded quizzes
        if report.quizzes.iter().any(|q| q.grade.is_some()) {
            html.push_str(&generate_bar_chart(&report.quizzes));
        }
    }

    if !report.course_grades.is_empty() {
        html.push_str("<h2>Course grades</h2>\n");
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Course</th><th>Semester</th><th>Student</th><th>Grade</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for row in &report.course_grades {
            html.push_str(&format!(
                "<tr><td>{} ({})</td><td>{}</td><td>{}</td><td class=\"grade\">{}</td></tr>\n",
                html_escape(&row.course),
                html_escape(&row.code),
                row.semester,
                html_escape(&row.student),
                row.grade,
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Per-step results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Steps</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Step</th><th onclick=\"sortTable(2)\">Expected</th><th onclick=\"sortTable(3)\">Outcome</th><th onclick=\"sortTable(4)\">Status</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for s in &report.steps {
        let class = match s.status {
            StepStatus::Passed => "pass",
            StepStatus::Failed => "fail",
            StepStatus::Skipped => "skip",
        };
        let expected = s
            .expected_error
            .map(|k| k.to_string())
            .unwrap_or_else(|| "ok".into());
        let outcome = match (s.error, s.message.as_deref()) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (Some(kind), None) => kind.to_string(),
            (None, Some(message)) => message.to_string(),
            (None, None) if s.status == StepStatus::Skipped => "-".to_string(),
            (None, None) => "ok".to_string(),
        };

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            class,
            s.step,
            html_escape(&s.description),
            html_escape(&expected),
            html_escape(&outcome),
            class,
            s.status
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &RunReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn generate_bar_chart(quizzes: &[QuizSummary]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let graded: Vec<(&str, u32)> = quizzes
        .iter()
        .filter_map(|q| q.grade.map(|g| (q.key.as_str(), g)))
        .collect();

    let total_height = graded.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (key, grade)) in graded.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (*grade).min(100) as usize * max_width / 100;

        // Green from the A band, amber from the D band.
        let color = if *grade >= 80 {
            "#22c55e"
        } else if *grade >= 50 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(key)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            grade
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.skip { background: var(--skip); color: #6b7280; }
.grade { font-weight: bold; font-size: 1.1rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizdesk_core::error::ErrorKind;
    use quizdesk_core::grading::LetterGrade;
    use quizdesk_core::report::*;

    fn make_test_report() -> RunReport {
        RunReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            scenario: ScenarioSummary {
                id: "midterm".into(),
                name: "Math <midterm>".into(),
                step_count: 2,
            },
            steps: vec![
                StepOutcome {
                    step: 1,
                    action: "grade".into(),
                    description: "grade midterm".into(),
                    status: StepStatus::Passed,
                    expected_error: Some(ErrorKind::UnmarkedQuiz),
                    error: Some(ErrorKind::UnmarkedQuiz),
                    message: Some("quiz quiz#0 has not been marked".into()),
                },
                StepOutcome {
                    step: 2,
                    action: "total".into(),
                    description: "total grade of snow in math".into(),
                    status: StepStatus::Failed,
                    expected_error: None,
                    error: Some(ErrorKind::UnEnrolledCourse),
                    message: Some("student HB256 is not enrolled in course HBZ5".into()),
                },
            ],
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
            duration_ms: 3,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Math &lt;midterm&gt;"));
        assert!(html.contains("Mid-term (MT-1)"));
        assert!(html.contains("<td class=\"grade\">D</td>"));
        assert!(html.contains("unmarked_quiz"));
        assert!(html.contains("<td class=\"fail\">failed</td>"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn html_report_without_quizzes() {
        let mut report = make_test_report();
        report.quizzes.clear();
        report.course_grades.clear();
        let html = generate_html(&report);

        assert!(html.contains("No quizzes were created."));
        assert!(!html.contains("<svg"));
        assert!(!html.contains("Course grades"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("<a href='x'>&</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;");
    }
}
