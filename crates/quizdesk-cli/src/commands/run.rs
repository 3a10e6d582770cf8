//! The `quizdesk run` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use quizdesk_core::report::{RunReport, StepOutcome, StepStatus};
use quizdesk_core::runner::{ProgressReporter, RunnerConfig, ScenarioRunner};
use quizdesk_core::scenario::{self, Scenario, StepAction};
use quizdesk_report::html::write_html_report;

use crate::config::load_config_from;

const FORMATS: [&str; 3] = ["json", "html", "markdown"];

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_step_start(&self, step: usize, action: &StepAction) {
        tracing::debug!(step, action = action.name(), "starting step");
    }

    fn on_step_complete(&self, outcome: &StepOutcome) {
        let status = match outcome.status {
            StepStatus::Passed => "OK",
            StepStatus::Failed => "FAIL",
            StepStatus::Skipped => "SKIP",
        };
        let detail = match (&outcome.expected_error, &outcome.message) {
            _ if outcome.status == StepStatus::Skipped => String::new(),
            (_, Some(message)) if outcome.status == StepStatus::Failed => format!(": {message}"),
            (Some(kind), _) => format!(" (raised {kind})"),
            _ => String::new(),
        };
        eprintln!(
            "  [{status:>4}] {:>3}. {}{detail}",
            outcome.step, outcome.description
        );
    }

    fn on_scenario_complete(
        &self,
        scenario: &Scenario,
        passed: usize,
        failed: usize,
        elapsed: Duration,
    ) {
        eprintln!(
            "\nComplete: {} :: {passed} passed, {failed} failed ({:.1}ms)",
            scenario.id,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

pub fn execute(
    scenario_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    stop_on_failure: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Load config
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let format = format.unwrap_or_else(|| config.default_format.clone());
    let formats = parse_formats(&format)?;

    // Load scenarios
    let scenarios = scenario::load_scenarios(&scenario_path)?;
    anyhow::ensure!(
        !scenarios.is_empty(),
        "no scenarios found in {}",
        scenario_path.display()
    );

    let runner = ScenarioRunner::new(RunnerConfig {
        stop_on_failure: stop_on_failure || config.stop_on_failure,
    });
    let reporter = ConsoleReporter;
    let mut failed_steps = 0;

    for scenario in &scenarios {
        eprintln!(
            "quizdesk v{}: running {} ({} steps)",
            env!("CARGO_PKG_VERSION"),
            scenario.name,
            scenario.steps.len()
        );
        eprintln!();

        let report = runner
            .run(scenario, &reporter)
            .with_context(|| format!("failed to run scenario {}", scenario.id))?;

        // Print summary tables
        print_summary(&report);
        failed_steps += report.failed_steps().count();

        // Save outputs
        std::fs::create_dir_all(&output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        let stem = report_stem(&report);
        write_outputs(&report, &output, &stem, &formats)?;
    }

    if failed_steps > 0 && config.fail_on_step_error {
        anyhow::bail!("{failed_steps} step(s) failed");
    }

    Ok(())
}

/// Split a comma-separated format list, expanding `all`.
fn parse_formats(format: &str) -> Result<Vec<&'static str>> {
    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if name == "all" {
            return Ok(FORMATS.to_vec());
        }
        let known = FORMATS.iter().find(|f| **f == name).ok_or_else(|| {
            anyhow::anyhow!("unknown format: {name} (expected json, html, markdown or all)")
        })?;
        if !formats.contains(known) {
            formats.push(*known);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "no output format given");
    Ok(formats)
}

/// `{scenario}-{timestamp}-{short report id}`; scenarios sharing an id in
/// the same second still get separate files.
fn report_stem(report: &RunReport) -> String {
    let id = report.id.simple().to_string();
    format!(
        "{}-{}-{}",
        report.scenario.id,
        chrono::Utc::now().format("%Y-%m-%dT%H%M%S"),
        &id[..8]
    )
}

fn write_outputs(report: &RunReport, output: &Path, stem: &str, formats: &[&str]) -> Result<()> {
    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "markdown" => {
                let path = output.join(format!("{stem}.md"));
                std::fs::write(&path, report.to_markdown())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Markdown report: {}", path.display());
            }
            other => tracing::warn!("unknown format: {other}"),
        }
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    use comfy_table::{Cell, Table};

    if !report.quizzes.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            "Quiz",
            "Course",
            "Student",
            "Submitted",
            "Marked",
            "Correct",
            "Grade",
        ]);
        for q in &report.quizzes {
            table.add_row(vec![
                Cell::new(format!("{} ({})", q.key, q.code)),
                Cell::new(&q.course),
                Cell::new(q.student.as_deref().unwrap_or("-")),
                Cell::new(if q.submitted { "yes" } else { "no" }),
                Cell::new(if q.marked { "yes" } else { "no" }),
                Cell::new(format!("{}/{}", q.correct, q.total)),
                Cell::new(q.grade.map(|g| format!("{g}%")).unwrap_or_else(|| "-".into())),
            ]);
        }
        eprintln!("\n{table}");
    }

    if !report.course_grades.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Course", "Semester", "Student", "Grade"]);
        for row in &report.course_grades {
            table.add_row(vec![
                Cell::new(format!("{} ({})", row.course, row.code)),
                Cell::new(row.semester),
                Cell::new(&row.student),
                Cell::new(row.grade),
            ]);
        }
        eprintln!("\n{table}");
    }

    eprintln!(
        "\n{} of {} steps passed",
        report.passed_count(),
        report.steps.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_parsed_and_deduplicated() {
        assert_eq!(parse_formats("json").unwrap(), vec!["json"]);
        assert_eq!(
            parse_formats("html, json,html").unwrap(),
            vec!["html", "json"]
        );
        assert_eq!(parse_formats("json,all").unwrap(), FORMATS.to_vec());
        assert!(parse_formats("sarif").is_err());
        assert!(parse_formats(" , ").is_err());
    }
}
