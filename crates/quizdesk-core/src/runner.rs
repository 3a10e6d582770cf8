//! Scenario runner.
//!
//! Replays a [`Scenario`] against a fresh [`Gradebook`], checks every step
//! against its expected outcome, and collects the result into a [`RunReport`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::error::QuizError;
use crate::gradebook::Gradebook;
use crate::grading::LetterGrade;
use crate::model::{CourseId, Question, QuizId, Student, StudentId, Teacher, TeacherId};
use crate::report::{
    CourseGradeRow, QuizSummary, RunReport, ScenarioSummary, StepOutcome, StepStatus,
};
use crate::scenario::{QuestionInput, Scenario, Step, StepAction};

/// Configuration for the scenario runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Skip the remaining steps after the first failed one.
    pub stop_on_failure: bool,
}

/// Progress reporting trait.
pub trait ProgressReporter {
    fn on_step_start(&self, step: usize, action: &StepAction);
    fn on_step_complete(&self, outcome: &StepOutcome);
    fn on_scenario_complete(
        &self,
        scenario: &Scenario,
        passed: usize,
        failed: usize,
        elapsed: Duration,
    );
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_step_start(&self, _: usize, _: &StepAction) {}
    fn on_step_complete(&self, _: &StepOutcome) {}
    fn on_scenario_complete(&self, _: &Scenario, _: usize, _: usize, _: Duration) {}
}

pub struct ScenarioRunner {
    config: RunnerConfig,
}

impl ScenarioRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run every step of `scenario` and report the outcome.
    ///
    /// Step failures are recorded in the report; an `Err` means the scenario
    /// itself could not be set up (duplicate person keys).
    pub fn run(&self, scenario: &Scenario, progress: &dyn ProgressReporter) -> Result<RunReport> {
        let start = Instant::now();
        let mut session = Session::new(scenario)?;
        let mut outcomes = Vec::with_capacity(scenario.steps.len());
        let mut halted = false;

        for (i, step) in scenario.steps.iter().enumerate() {
            let n = i + 1;
            if halted {
                let outcome = skipped(n, step);
                progress.on_step_complete(&outcome);
                outcomes.push(outcome);
                continue;
            }

            progress.on_step_start(n, &step.action);
            let result = session.execute(&step.action);
            let outcome = evaluate(n, step, result);
            progress.on_step_complete(&outcome);

            if outcome.status == StepStatus::Failed {
                tracing::info!(
                    scenario = %scenario.id,
                    step = n,
                    "step failed: {}",
                    outcome.message.as_deref().unwrap_or("unknown")
                );
                halted = self.config.stop_on_failure;
            }
            outcomes.push(outcome);
        }

        let elapsed = start.elapsed();
        let passed = outcomes.iter().filter(|o| o.status == StepStatus::Passed).count();
        let failed = outcomes.iter().filter(|o| o.status == StepStatus::Failed).count();
        progress.on_scenario_complete(scenario, passed, failed, elapsed);

        Ok(RunReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            scenario: ScenarioSummary {
                id: scenario.id.clone(),
                name: scenario.name.clone(),
                step_count: scenario.steps.len(),
            },
            steps: outcomes,
            quizzes: session.quiz_summaries(),
            course_grades: session.course_grades,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

/// Compare a step's result with its expectation.
fn evaluate(n: usize, step: &Step, result: Result<(), QuizError>) -> StepOutcome {
    let (status, error, message) = match (result, step.expect_error) {
        (Ok(()), None) => (StepStatus::Passed, None, None),
        (Ok(()), Some(expected)) => (
            StepStatus::Failed,
            None,
            Some(format!("expected {expected}, but the step succeeded")),
        ),
        (Err(e), Some(expected)) if e.kind() == expected => {
            (StepStatus::Passed, Some(e.kind()), Some(e.to_string()))
        }
        (Err(e), Some(expected)) => (
            StepStatus::Failed,
            Some(e.kind()),
            Some(format!("expected {expected}, got {}: {e}", e.kind())),
        ),
        (Err(e), None) => (StepStatus::Failed, Some(e.kind()), Some(e.to_string())),
    };

    StepOutcome {
        step: n,
        action: step.action.name().to_string(),
        description: step.action.to_string(),
        status,
        expected_error: step.expect_error,
        error,
        message,
    }
}

fn skipped(n: usize, step: &Step) -> StepOutcome {
    StepOutcome {
        step: n,
        action: step.action.name().to_string(),
        description: step.action.to_string(),
        status: StepStatus::Skipped,
        expected_error: step.expect_error,
        error: None,
        message: None,
    }
}

/// Gradebook plus the scenario-key bindings of one run.
struct Session {
    book: Gradebook,
    teachers: HashMap<String, TeacherId>,
    students: HashMap<String, StudentId>,
    courses: HashMap<String, CourseId>,
    quizzes: HashMap<String, QuizId>,
    /// Quiz keys in creation order, for the final summary.
    quiz_order: Vec<(String, QuizId)>,
    course_grades: Vec<CourseGradeRow>,
}

impl Session {
    fn new(scenario: &Scenario) -> Result<Self> {
        let mut book = Gradebook::new();
        let mut teachers = HashMap::new();
        let mut students = HashMap::new();

        for decl in &scenario.teachers {
            if teachers.contains_key(&decl.key) {
                anyhow::bail!("duplicate teacher key: {}", decl.key);
            }
            let id = book.add_teacher(Teacher::new(&decl.first_name, &decl.last_name, &decl.number));
            teachers.insert(decl.key.clone(), id);
        }
        for decl in &scenario.students {
            if students.contains_key(&decl.key) {
                anyhow::bail!("duplicate student key: {}", decl.key);
            }
            let id = book.add_student(Student::new(&decl.first_name, &decl.last_name, &decl.number));
            students.insert(decl.key.clone(), id);
        }

        Ok(Self {
            book,
            teachers,
            students,
            courses: HashMap::new(),
            quizzes: HashMap::new(),
            quiz_order: Vec::new(),
            course_grades: Vec::new(),
        })
    }

    fn execute(&mut self, action: &StepAction) -> Result<(), QuizError> {
        match action {
            StepAction::CreateCourse {
                course,
                name,
                code,
                semester,
                teacher,
            } => {
                let teacher = self.teacher(teacher)?;
                let id = self.book.create_course(name, code, *semester, teacher)?;
                self.courses.insert(course.clone(), id);
            }
            StepAction::CreateQuiz {
                quiz,
                name,
                code,
                course,
                questions,
            } => {
                // Questions exist before the quiz, so their errors come first.
                let questions = build_questions(questions)?;
                let course = self.course(course)?;
                let id = self.book.create_quiz(name, code, course, questions)?;
                self.quizzes.insert(quiz.clone(), id);
                self.quiz_order.retain(|(key, _)| key != quiz);
                self.quiz_order.push((quiz.clone(), id));
            }
            StepAction::Enroll { student, course } => {
                let student = self.student(student)?;
                let course = self.course(course)?;
                self.book.enroll_into_course(student, course)?;
            }
            StepAction::Assign { quiz, student } => {
                let quiz = self.quiz(quiz)?;
                let student = self.student(student)?;
                self.book.assign_quiz(quiz, student)?;
            }
            StepAction::Answer {
                student,
                quiz,
                answers,
            } => {
                let student = self.student(student)?;
                let quiz = self.quiz(quiz)?;
                self.book.answer_quiz(student, quiz, answers)?;
            }
            StepAction::Submit { student, quiz } => {
                let student = self.student(student)?;
                let quiz = self.quiz(quiz)?;
                self.book.submit_quiz(student, quiz)?;
            }
            StepAction::Mark { quiz, guide } => {
                let quiz = self.quiz(quiz)?;
                self.book.mark_quiz(quiz, guide)?;
            }
            StepAction::Grade { quiz } => {
                let quiz = self.quiz(quiz)?;
                self.book.grade_quiz(quiz)?;
            }
            StepAction::Total {
                student: student_key,
                course: course_key,
            } => {
                let student = self.student(student_key)?;
                let course = self.course(course_key)?;
                let grade = self.book.calculate_total_grade(student, course)?;
                self.record_course_grade(student_key, course_key, course, grade);
            }
        }
        Ok(())
    }

    fn record_course_grade(
        &mut self,
        student_key: &str,
        course_key: &str,
        course: CourseId,
        grade: LetterGrade,
    ) {
        let Some(offering) = self.book.course(course) else {
            return;
        };
        let row = CourseGradeRow {
            course: course_key.to_string(),
            code: offering.code.clone(),
            semester: offering.semester,
            student: student_key.to_string(),
            grade,
        };
        // A later total for the same pair replaces the earlier one.
        self.course_grades
            .retain(|r| !(r.course == row.course && r.student == row.student));
        self.course_grades.push(row);
    }

    fn teacher(&self, key: &str) -> Result<TeacherId, QuizError> {
        self.teachers
            .get(key)
            .copied()
            .ok_or_else(|| QuizError::InvalidCourseTeacher(format!("'{key}'")))
    }

    fn student(&self, key: &str) -> Result<StudentId, QuizError> {
        self.students
            .get(key)
            .copied()
            .ok_or_else(|| QuizError::InvalidStudent(format!("'{key}'")))
    }

    fn course(&self, key: &str) -> Result<CourseId, QuizError> {
        self.courses
            .get(key)
            .copied()
            .ok_or_else(|| QuizError::InvalidCourse(format!("'{key}'")))
    }

    fn quiz(&self, key: &str) -> Result<QuizId, QuizError> {
        self.quizzes
            .get(key)
            .copied()
            .ok_or_else(|| QuizError::InvalidQuiz(format!("'{key}'")))
    }

    fn quiz_summaries(&self) -> Vec<QuizSummary> {
        let student_keys: HashMap<StudentId, &str> =
            self.students.iter().map(|(k, id)| (*id, k.as_str())).collect();
        let course_keys: HashMap<CourseId, &str> =
            self.courses.iter().map(|(k, id)| (*id, k.as_str())).collect();

        self.quiz_order
            .iter()
            .filter_map(|(key, id)| {
                let quiz = self.book.quiz(*id)?;
                Some(QuizSummary {
                    key: key.clone(),
                    name: quiz.name.clone(),
                    code: quiz.code.clone(),
                    course: course_keys
                        .get(&quiz.course)
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| quiz.course.to_string()),
                    student: quiz.student.map(|s| {
                        student_keys
                            .get(&s)
                            .map(|k| k.to_string())
                            .unwrap_or_else(|| s.to_string())
                    }),
                    submitted: quiz.submitted,
                    marked: quiz.marked,
                    teacher_graded: quiz.teacher_graded,
                    correct: quiz.correct_count(),
                    total: quiz.questions.len(),
                    grade: quiz.grade,
                })
            })
            .collect()
    }
}

/// Turn scenario question entries into questions.
///
/// The count is checked before the entries themselves, so a single malformed
/// entry reports `invalid_number_of_questions`.
fn build_questions(inputs: &[QuestionInput]) -> Result<Vec<Question>, QuizError> {
    if inputs.len() < 2 {
        return Err(QuizError::InvalidNumberOfQuestions {
            found: inputs.len(),
        });
    }
    inputs
        .iter()
        .map(|input| match input {
            QuestionInput::Question { number, choices } => Question::new(*number, choices.iter()),
            QuestionInput::Malformed(raw) => Err(QuizError::InvalidQuestion(raw.clone())),
        })
        .collect()
}
