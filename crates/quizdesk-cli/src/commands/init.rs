//! The `quizdesk init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizdesk.toml
    if std::path::Path::new("quizdesk.toml").exists() {
        println!("quizdesk.toml already exists, skipping.");
    } else {
        std::fs::write("quizdesk.toml", SAMPLE_CONFIG)?;
        println!("Created quizdesk.toml");
    }

    // Create example scenario
    std::fs::create_dir_all("scenarios")?;
    let example_path = std::path::Path::new("scenarios/example.toml");
    if example_path.exists() {
        println!("scenarios/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCENARIO)?;
        println!("Created scenarios/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit scenarios/example.toml to describe your course");
    println!("  2. Run: quizdesk validate --scenario scenarios/example.toml");
    println!("  3. Run: quizdesk run --scenario scenarios/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdesk configuration

# Where reports are written. ${VAR} references are expanded.
output_dir = "./quizdesk-results"

# json, html, markdown, or all (comma-separated)
default_format = "json"

# Exit with status 1 when a step fails
fail_on_step_error = true

# Skip the rest of a scenario after its first failed step
stop_on_failure = false
"#;

const EXAMPLE_SCENARIO: &str = r#"[scenario]
id = "example"
name = "Example scenario"
description = "One quiz from creation to course grade"

[[teachers]]
key = "doe"
first_name = "John"
last_name = "Doe"
number = "TR25"

[[students]]
key = "snow"
first_name = "John"
last_name = "Snow"
number = "HB256"

[[steps]]
action = "create_course"
course = "math"
name = "Math"
code = "HBZ5"
semester = 1
teacher = "doe"

[[steps]]
action = "enroll"
student = "snow"
course = "math"

[[steps]]
action = "create_quiz"
quiz = "midterm"
name = "Mid-term"
code = "MT-1"
course = "math"
questions = [
    { number = 1, choices = ["a", "b", "c", "d"] },
    { number = 2, choices = ["i", "ii", "iii"] },
]

[[steps]]
action = "assign"
quiz = "midterm"
student = "snow"

[[steps]]
action = "answer"
student = "snow"
quiz = "midterm"
answers = [{ question = 1, choice = "b" }, { question = 2, choice = "ii" }]

[[steps]]
action = "submit"
student = "snow"
quiz = "midterm"

[[steps]]
action = "mark"
quiz = "midterm"
guide = [{ question = 1, choice = "b" }, { question = 2, choice = "ii" }]

[[steps]]
action = "grade"
quiz = "midterm"

[[steps]]
action = "total"
student = "snow"
course = "math"
"#;
