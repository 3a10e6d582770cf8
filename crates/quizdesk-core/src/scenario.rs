//! TOML scenario parser.
//!
//! A scenario declares teachers and students, then drives the gradebook
//! through an ordered list of steps. Loads scenarios from TOML files and
//! directories, and validates them.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::model::{Answers, MarkingGuide};

/// Intermediate TOML structure for parsing scenario files.
#[derive(Debug, Deserialize)]
struct TomlScenarioFile {
    scenario: TomlScenarioHeader,
    #[serde(default)]
    teachers: Vec<PersonDecl>,
    #[serde(default)]
    students: Vec<PersonDecl>,
    #[serde(default)]
    steps: Vec<TomlStep>,
}

#[derive(Debug, Deserialize)]
struct TomlScenarioHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlStep {
    action: String,
    #[serde(default)]
    expect_error: Option<String>,
    #[serde(default)]
    student: Option<String>,
    #[serde(default)]
    course: Option<String>,
    #[serde(default)]
    quiz: Option<String>,
    #[serde(default)]
    teacher: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    semester: Option<u32>,
    #[serde(default)]
    questions: Vec<toml::Value>,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
    #[serde(default)]
    guide: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    question: u32,
    choice: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    number: u32,
    choices: Vec<String>,
}

/// A declared teacher or student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDecl {
    /// Key used by steps to refer to this person.
    pub key: String,
    pub first_name: String,
    pub last_name: String,
    /// Teacher or student number.
    pub number: String,
}

/// A question as written in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuestionInput {
    Question { number: u32, choices: Vec<String> },
    /// An entry that is not a `{ number, choices }` table, kept verbatim so the
    /// runner can reject it when the quiz is built.
    Malformed(String),
}

/// What a step does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepAction {
    CreateCourse {
        course: String,
        name: String,
        code: String,
        semester: u32,
        teacher: String,
    },
    CreateQuiz {
        quiz: String,
        name: String,
        code: String,
        course: String,
        questions: Vec<QuestionInput>,
    },
    Enroll {
        student: String,
        course: String,
    },
    Assign {
        quiz: String,
        student: String,
    },
    Answer {
        student: String,
        quiz: String,
        answers: Answers,
    },
    Submit {
        student: String,
        quiz: String,
    },
    Mark {
        quiz: String,
        guide: MarkingGuide,
    },
    Grade {
        quiz: String,
    },
    Total {
        student: String,
        course: String,
    },
}

impl StepAction {
    /// Action name as written in scenario files.
    pub fn name(&self) -> &'static str {
        match self {
            StepAction::CreateCourse { .. } => "create_course",
            StepAction::CreateQuiz { .. } => "create_quiz",
            StepAction::Enroll { .. } => "enroll",
            StepAction::Assign { .. } => "assign",
            StepAction::Answer { .. } => "answer",
            StepAction::Submit { .. } => "submit",
            StepAction::Mark { .. } => "mark",
            StepAction::Grade { .. } => "grade",
            StepAction::Total { .. } => "total",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepAction::CreateCourse { course, teacher, .. } => {
                write!(f, "create_course {course} (teacher {teacher})")
            }
            StepAction::CreateQuiz { quiz, course, .. } => {
                write!(f, "create_quiz {quiz} in {course}")
            }
            StepAction::Enroll { student, course } => write!(f, "enroll {student} into {course}"),
            StepAction::Assign { quiz, student } => write!(f, "assign {quiz} to {student}"),
            StepAction::Answer { student, quiz, .. } => write!(f, "{student} answers {quiz}"),
            StepAction::Submit { student, quiz } => write!(f, "{student} submits {quiz}"),
            StepAction::Mark { quiz, .. } => write!(f, "mark {quiz}"),
            StepAction::Grade { quiz } => write!(f, "grade {quiz}"),
            StepAction::Total { student, course } => {
                write!(f, "total grade of {student} in {course}")
            }
        }
    }
}

/// One workflow step, optionally expected to fail with a given kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub action: StepAction,
    #[serde(default)]
    pub expect_error: Option<ErrorKind>,
}

/// A parsed scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub teachers: Vec<PersonDecl>,
    #[serde(default)]
    pub students: Vec<PersonDecl>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Parse a single TOML file into a `Scenario`.
pub fn parse_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    parse_scenario_str(&content, path)
}

/// Parse a TOML string into a `Scenario` (useful for testing).
pub fn parse_scenario_str(content: &str, source_path: &Path) -> Result<Scenario> {
    let parsed: TomlScenarioFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let steps = parsed
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            convert_step(s).with_context(|| {
                format!("invalid step {} in {}", i + 1, source_path.display())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Scenario {
        id: parsed.scenario.id,
        name: parsed.scenario.name,
        description: parsed.scenario.description,
        teachers: parsed.teachers,
        students: parsed.students,
        steps,
    })
}

fn convert_step(step: TomlStep) -> Result<Step> {
    let expect_error = step
        .expect_error
        .as_deref()
        .map(|k| k.parse::<ErrorKind>().map_err(|e| anyhow::anyhow!("{}", e)))
        .transpose()?;

    let action_name = step.action.as_str();
    let require = |field: Option<String>, name: &str| -> Result<String> {
        field.ok_or_else(|| anyhow::anyhow!("`{action_name}` step is missing `{name}`"))
    };

    let action = match action_name {
        "create_course" => StepAction::CreateCourse {
            course: require(step.course, "course")?,
            name: require(step.name, "name")?,
            code: require(step.code, "code")?,
            semester: step
                .semester
                .ok_or_else(|| anyhow::anyhow!("`create_course` step is missing `semester`"))?,
            teacher: require(step.teacher, "teacher")?,
        },
        "create_quiz" => StepAction::CreateQuiz {
            quiz: require(step.quiz, "quiz")?,
            name: require(step.name, "name")?,
            code: require(step.code, "code")?,
            course: require(step.course, "course")?,
            questions: step.questions.into_iter().map(convert_question).collect(),
        },
        "enroll" => StepAction::Enroll {
            student: require(step.student, "student")?,
            course: require(step.course, "course")?,
        },
        "assign" => StepAction::Assign {
            quiz: require(step.quiz, "quiz")?,
            student: require(step.student, "student")?,
        },
        "answer" => StepAction::Answer {
            student: require(step.student, "student")?,
            quiz: require(step.quiz, "quiz")?,
            answers: step
                .answers
                .into_iter()
                .map(|a| (a.question, a.choice))
                .collect(),
        },
        "submit" => StepAction::Submit {
            student: require(step.student, "student")?,
            quiz: require(step.quiz, "quiz")?,
        },
        "mark" => StepAction::Mark {
            quiz: require(step.quiz, "quiz")?,
            guide: step
                .guide
                .into_iter()
                .map(|a| (a.question, a.choice))
                .collect(),
        },
        "grade" => StepAction::Grade {
            quiz: require(step.quiz, "quiz")?,
        },
        "total" => StepAction::Total {
            student: require(step.student, "student")?,
            course: require(step.course, "course")?,
        },
        other => anyhow::bail!("unknown action: {other}"),
    };

    Ok(Step {
        action,
        expect_error,
    })
}

fn convert_question(value: toml::Value) -> QuestionInput {
    let raw = value.to_string();
    match value.try_into::<TomlQuestion>() {
        Ok(q) => QuestionInput::Question {
            number: q.number,
            choices: q.choices,
        },
        Err(_) => QuestionInput::Malformed(raw),
    }
}

/// Recursively load all `.toml` scenario files from a directory.
pub fn load_scenario_directory(dir: &Path) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            scenarios.extend(load_scenario_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_scenario(&path) {
                Ok(scenario) => scenarios.push(scenario),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(scenarios)
}

/// Load a single file, or every scenario under a directory.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    if path.is_dir() {
        load_scenario_directory(path)
    } else {
        Ok(vec![parse_scenario(path)?])
    }
}

/// A warning from scenario validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based step number (if applicable).
    pub step: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a scenario for common issues.
///
/// References to unknown keys are only reported for steps that do not expect
/// an error, since pointing at a missing entity is a legitimate way to
/// exercise the `invalid_*` failures.
pub fn validate_scenario(scenario: &Scenario) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if scenario.steps.is_empty() {
        warnings.push(ValidationWarning {
            step: None,
            message: "scenario has no steps".into(),
        });
    }

    // Duplicate person keys
    for (label, people) in [("teacher", &scenario.teachers), ("student", &scenario.students)] {
        let mut seen = HashSet::new();
        for person in people {
            if !seen.insert(person.key.as_str()) {
                warnings.push(ValidationWarning {
                    step: None,
                    message: format!("duplicate {label} key: {}", person.key),
                });
            }
        }
    }

    let teachers: HashSet<&str> = scenario.teachers.iter().map(|t| t.key.as_str()).collect();
    let students: HashSet<&str> = scenario.students.iter().map(|s| s.key.as_str()).collect();
    let mut courses: HashSet<&str> = HashSet::new();
    let mut quizzes: HashSet<&str> = HashSet::new();

    for (i, step) in scenario.steps.iter().enumerate() {
        let n = i + 1;
        let mut unknown = Vec::new();
        match &step.action {
            StepAction::CreateCourse { teacher, .. } => {
                note_unknown(&teachers, "teacher", teacher, &mut unknown)
            }
            StepAction::CreateQuiz { course, .. } => {
                note_unknown(&courses, "course", course, &mut unknown)
            }
            StepAction::Enroll { student, course } | StepAction::Total { student, course } => {
                note_unknown(&students, "student", student, &mut unknown);
                note_unknown(&courses, "course", course, &mut unknown);
            }
            StepAction::Assign { quiz, student }
            | StepAction::Answer { quiz, student, .. }
            | StepAction::Submit { quiz, student } => {
                note_unknown(&quizzes, "quiz", quiz, &mut unknown);
                note_unknown(&students, "student", student, &mut unknown);
            }
            StepAction::Mark { quiz, .. } | StepAction::Grade { quiz } => {
                note_unknown(&quizzes, "quiz", quiz, &mut unknown)
            }
        }

        if step.expect_error.is_none() {
            for what in unknown {
                warnings.push(ValidationWarning {
                    step: Some(n),
                    message: format!("{} references undeclared {what}", step.action.name()),
                });
            }
        }

        if let StepAction::Mark { guide, .. } = &step.action {
            if guide.is_empty() {
                warnings.push(ValidationWarning {
                    step: Some(n),
                    message: "marking guide is empty; the quiz will stay unmarked".into(),
                });
            }
        }

        match &step.action {
            StepAction::CreateCourse { course, .. } => {
                if !courses.insert(course.as_str()) {
                    warnings.push(ValidationWarning {
                        step: Some(n),
                        message: format!("course key '{course}' is bound twice"),
                    });
                }
            }
            StepAction::CreateQuiz { quiz, .. } => {
                if !quizzes.insert(quiz.as_str()) {
                    warnings.push(ValidationWarning {
                        step: Some(n),
                        message: format!("quiz key '{quiz}' is bound twice"),
                    });
                }
            }
            _ => {}
        }
    }

    warnings
}

fn note_unknown(known: &HashSet<&str>, label: &str, key: &str, unknown: &mut Vec<String>) {
    if !known.contains(key) {
        unknown.push(format!("{label} '{key}'"));
    }
}
