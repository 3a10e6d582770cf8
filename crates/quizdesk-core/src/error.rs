//! Domain error types.
//!
//! Every variant corresponds to exactly one violated precondition of a
//! gradebook operation. Callers that only need the category match on
//! [`QuizError::kind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuizId;

/// Errors raised by gradebook operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The student is already enrolled in this exact course offering.
    #[error("student {student_number} is already enrolled in course {course_code}")]
    AlreadyEnrolled {
        student_number: String,
        course_code: String,
    },

    /// An answer is not one of the question's choices.
    #[error("'{choice}' is not a valid choice for question {question}")]
    InvalidChoice { question: u32, choice: String },

    /// The referenced course does not exist in this gradebook.
    #[error("invalid course: {0}")]
    InvalidCourse(String),

    /// The referenced course teacher does not exist in this gradebook.
    #[error("invalid course teacher: {0}")]
    InvalidCourseTeacher(String),

    /// A quiz element is not a well-formed question.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// The referenced quiz does not exist in this gradebook.
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),

    /// A quiz needs at least two questions.
    #[error("a quiz needs at least 2 questions, got {found}")]
    InvalidNumberOfQuestions { found: usize },

    /// The quiz is assigned to someone else.
    #[error("quiz is assigned to student {assigned}, not {acting}")]
    InvalidVerification { assigned: String, acting: String },

    /// The referenced student does not exist in this gradebook.
    #[error("invalid student: {0}")]
    InvalidStudent(String),

    /// A question needs at least two choices.
    #[error("question {question} needs at least 2 choices, got {found}")]
    MultipleChoices { question: u32, found: usize },

    /// The quiz has not been assigned to any student yet.
    #[error("quiz {0} has not been assigned")]
    UnassignedQuiz(QuizId),

    /// The student is not enrolled in the course offering.
    #[error("student {student_number} is not enrolled in course {course_code}")]
    UnEnrolledCourse {
        student_number: String,
        course_code: String,
    },

    /// The quiz has not been marked yet.
    #[error("quiz {0} has not been marked")]
    UnmarkedQuiz(QuizId),

    /// The quiz has not been submitted yet.
    #[error("quiz {0} has not been submitted")]
    UnsubmittedQuiz(QuizId),

    /// No teacher-graded quizzes exist to average.
    #[error("student {student_number} has no graded quizzes in course {course_code}")]
    NoGradedQuizzes {
        student_number: String,
        course_code: String,
    },

    /// An average fell outside every letter-grade band.
    #[error("score {0} is outside the grading standard")]
    GradeOutOfRange(u32),
}

impl QuizError {
    /// Stable, serializable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::AlreadyEnrolled { .. } => ErrorKind::AlreadyEnrolled,
            QuizError::InvalidChoice { .. } => ErrorKind::InvalidChoice,
            QuizError::InvalidCourse(_) => ErrorKind::InvalidCourse,
            QuizError::InvalidCourseTeacher(_) => ErrorKind::InvalidCourseTeacher,
            QuizError::InvalidQuestion(_) => ErrorKind::InvalidQuestion,
            QuizError::InvalidQuiz(_) => ErrorKind::InvalidQuiz,
            QuizError::InvalidNumberOfQuestions { .. } => ErrorKind::InvalidNumberOfQuestions,
            QuizError::InvalidVerification { .. } => ErrorKind::InvalidVerification,
            QuizError::InvalidStudent(_) => ErrorKind::InvalidStudent,
            QuizError::MultipleChoices { .. } => ErrorKind::MultipleChoices,
            QuizError::UnassignedQuiz(_) => ErrorKind::UnassignedQuiz,
            QuizError::UnEnrolledCourse { .. } => ErrorKind::UnEnrolledCourse,
            QuizError::UnmarkedQuiz(_) => ErrorKind::UnmarkedQuiz,
            QuizError::UnsubmittedQuiz(_) => ErrorKind::UnsubmittedQuiz,
            QuizError::NoGradedQuizzes { .. } => ErrorKind::NoGradedQuizzes,
            QuizError::GradeOutOfRange(_) => ErrorKind::GradeOutOfRange,
        }
    }

    /// Returns `true` if a required earlier workflow state was not reached.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(
            self,
            QuizError::UnassignedQuiz(_) | QuizError::UnsubmittedQuiz(_) | QuizError::UnmarkedQuiz(_)
        )
    }
}

/// Discriminant of [`QuizError`], as written in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AlreadyEnrolled,
    InvalidChoice,
    InvalidCourse,
    InvalidCourseTeacher,
    InvalidQuestion,
    InvalidQuiz,
    InvalidNumberOfQuestions,
    InvalidVerification,
    InvalidStudent,
    MultipleChoices,
    UnassignedQuiz,
    #[serde(rename = "unenrolled_course")]
    UnEnrolledCourse,
    UnmarkedQuiz,
    UnsubmittedQuiz,
    NoGradedQuizzes,
    GradeOutOfRange,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 16] = [
        ErrorKind::AlreadyEnrolled,
        ErrorKind::InvalidChoice,
        ErrorKind::InvalidCourse,
        ErrorKind::InvalidCourseTeacher,
        ErrorKind::InvalidQuestion,
        ErrorKind::InvalidQuiz,
        ErrorKind::InvalidNumberOfQuestions,
        ErrorKind::InvalidVerification,
        ErrorKind::InvalidStudent,
        ErrorKind::MultipleChoices,
        ErrorKind::UnassignedQuiz,
        ErrorKind::UnEnrolledCourse,
        ErrorKind::UnmarkedQuiz,
        ErrorKind::UnsubmittedQuiz,
        ErrorKind::NoGradedQuizzes,
        ErrorKind::GradeOutOfRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AlreadyEnrolled => "already_enrolled",
            ErrorKind::InvalidChoice => "invalid_choice",
            ErrorKind::InvalidCourse => "invalid_course",
            ErrorKind::InvalidCourseTeacher => "invalid_course_teacher",
            ErrorKind::InvalidQuestion => "invalid_question",
            ErrorKind::InvalidQuiz => "invalid_quiz",
            ErrorKind::InvalidNumberOfQuestions => "invalid_number_of_questions",
            ErrorKind::InvalidVerification => "invalid_verification",
            ErrorKind::InvalidStudent => "invalid_student",
            ErrorKind::MultipleChoices => "multiple_choices",
            ErrorKind::UnassignedQuiz => "unassigned_quiz",
            ErrorKind::UnEnrolledCourse => "unenrolled_course",
            ErrorKind::UnmarkedQuiz => "unmarked_quiz",
            ErrorKind::UnsubmittedQuiz => "unsubmitted_quiz",
            ErrorKind::NoGradedQuizzes => "no_graded_quizzes",
            ErrorKind::GradeOutOfRange => "grade_out_of_range",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown error kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
        }
        assert!("not_a_kind".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn serde_name_matches_as_str() {
        let json = serde_json::to_string(&ErrorKind::UnEnrolledCourse).unwrap();
        assert_eq!(json, "\"unenrolled_course\"");
        let json = serde_json::to_string(&ErrorKind::InvalidNumberOfQuestions).unwrap();
        assert_eq!(json, "\"invalid_number_of_questions\"");
    }

    #[test]
    fn ordering_violations() {
        assert!(QuizError::UnmarkedQuiz(QuizId(0)).is_ordering_violation());
        assert!(QuizError::UnsubmittedQuiz(QuizId(0)).is_ordering_violation());
        assert!(QuizError::UnassignedQuiz(QuizId(0)).is_ordering_violation());
        assert!(!QuizError::InvalidQuiz(QuizId(0).to_string()).is_ordering_violation());
    }

    #[test]
    fn messages_name_the_entities() {
        let err = QuizError::AlreadyEnrolled {
            student_number: "HB256".into(),
            course_code: "HBZ5".into(),
        };
        assert_eq!(
            err.to_string(),
            "student HB256 is already enrolled in course HBZ5"
        );
        assert_eq!(err.kind(), ErrorKind::AlreadyEnrolled);
    }
}
