//! The `quizdesk validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(scenario_path: PathBuf) -> Result<()> {
    let scenarios = quizdesk_core::scenario::load_scenarios(&scenario_path)?;
    anyhow::ensure!(
        !scenarios.is_empty(),
        "no scenarios found in {}",
        scenario_path.display()
    );

    let mut total_warnings = 0;

    for scenario in &scenarios {
        println!(
            "Scenario: {} ({} steps, {} teachers, {} students)",
            scenario.name,
            scenario.steps.len(),
            scenario.teachers.len(),
            scenario.students.len()
        );

        let warnings = quizdesk_core::scenario::validate_scenario(scenario);
        for w in &warnings {
            let prefix = w
                .step
                .map(|n| format!("  [step {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All scenarios valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
