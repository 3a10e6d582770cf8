//! quizdesk-core: quiz domain model, gradebook workflow, and scenario runner.
//!
//! A [`Gradebook`](gradebook::Gradebook) owns teachers, courses, quizzes and
//! students. Students enroll, answer and submit; teachers create, assign,
//! mark and grade quizzes, then derive a letter grade per course. Scenarios
//! written in TOML replay that workflow and produce a [`RunReport`](report::RunReport).

pub mod error;
pub mod gradebook;
pub mod grading;
pub mod model;
pub mod report;
pub mod runner;
pub mod scenario;
mod student;
mod teacher;

pub use error::{ErrorKind, QuizError};
pub use gradebook::Gradebook;
pub use grading::LetterGrade;
