//! Core data model types for quizdesk.
//!
//! Entities are plain data. They are owned by a [`Gradebook`](crate::gradebook::Gradebook)
//! and refer to each other through typed ids, so "the same course" always
//! means "the same id" rather than equal field values.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::grading::LetterGrade;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Handle to a [`Teacher`] in a gradebook.
    TeacherId,
    "teacher"
);
entity_id!(
    /// Handle to a [`Course`] offering in a gradebook.
    CourseId,
    "course"
);
entity_id!(
    /// Handle to a [`Quiz`] in a gradebook.
    QuizId,
    "quiz"
);
entity_id!(
    /// Handle to a [`Student`] in a gradebook.
    StudentId,
    "student"
);

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number, unique within its quiz.
    pub number: u32,
    /// Allowed answers.
    pub choices: Vec<String>,
    /// The student's recorded answer.
    pub answer: Option<String>,
    /// Set by marking; unanswered or wrong answers stay `false`.
    pub answer_result: bool,
}

impl Question {
    /// Create a question. At least two choices are required.
    pub fn new<I, S>(number: u32, choices: I) -> Result<Self, QuizError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if choices.len() < 2 {
            return Err(QuizError::MultipleChoices {
                question: number,
                found: choices.len(),
            });
        }
        Ok(Self {
            number,
            choices,
            answer: None,
            answer_result: false,
        })
    }

    /// Whether `choice` is one of this question's choices.
    pub fn accepts(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }
}

/// An ordered quiz owned by one course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub name: String,
    pub code: String,
    /// Owning course. Never changes after creation.
    pub course: CourseId,
    pub questions: Vec<Question>,
    /// Assigned student, if any.
    pub student: Option<StudentId>,
    pub submitted: bool,
    pub marked: bool,
    pub teacher_graded: bool,
    /// Percentage score, set by grading.
    pub grade: Option<u32>,
}

impl Quiz {
    /// Create a quiz with at least two questions with distinct numbers.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        course: CourseId,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        if questions.len() < 2 {
            return Err(QuizError::InvalidNumberOfQuestions {
                found: questions.len(),
            });
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.number) {
                return Err(QuizError::InvalidQuestion(format!(
                    "duplicate question number {}",
                    question.number
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            code: code.into(),
            course,
            questions,
            student: None,
            submitted: false,
            marked: false,
            teacher_graded: false,
            grade: None,
        })
    }

    /// Look up a question by number.
    pub fn question(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    /// Number of questions marked correct.
    pub fn correct_count(&self) -> usize {
        self.questions.iter().filter(|q| q.answer_result).count()
    }

    /// Number of questions with a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.answer.is_some()).count()
    }
}

/// A course offering. Same name and code in another semester is a different course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub code: String,
    pub semester: u32,
    pub teacher: TeacherId,
    pub quizzes: Vec<QuizId>,
    /// Last computed aggregate grade.
    pub course_grade: Option<LetterGrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub student_number: String,
    pub enrolled_courses: Vec<CourseId>,
    /// Bookkeeping only; no check reads it.
    pub assigned_quizzes: Vec<QuizId>,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        student_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            student_number: student_number.into(),
            enrolled_courses: Vec::new(),
            assigned_quizzes: Vec::new(),
        }
    }

    pub fn is_enrolled_in(&self, course: CourseId) -> bool {
        self.enrolled_courses.contains(&course)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub first_name: String,
    pub last_name: String,
    pub teacher_number: String,
}

impl Teacher {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        teacher_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            teacher_number: teacher_number.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One `question number -> choice` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: u32,
    pub choice: String,
}

/// Ordered question-number to choice mapping.
///
/// Entries are processed in insertion order. Repeated numbers are kept, so a
/// later entry for the same question overwrites an earlier one when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    entries: Vec<AnswerEntry>,
}

/// A teacher's correct answers, in the same shape as a student's answers.
pub type MarkingGuide = Answers;

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, question: u32, choice: impl Into<String>) -> Self {
        self.push(question, choice);
        self
    }

    pub fn push(&mut self, question: u32, choice: impl Into<String>) {
        self.entries.push(AnswerEntry {
            question,
            choice: choice.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for Answers {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        let mut answers = Answers::new();
        for (question, choice) in iter {
            answers.push(question, choice);
        }
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(number: u32) -> Question {
        Question::new(number, ["a", "b"]).unwrap()
    }

    #[test]
    fn question_requires_two_choices() {
        let err = Question::new(5, Vec::<String>::new()).unwrap_err();
        assert_eq!(
            err,
            QuizError::MultipleChoices {
                question: 5,
                found: 0
            }
        );
        assert!(Question::new(5, ["only"]).is_err());

        let q = Question::new(1, ["a", "b", "c", "d"]).unwrap();
        assert_eq!(q.choices, vec!["a", "b", "c", "d"]);
        assert!(q.answer.is_none());
        assert!(!q.answer_result);
    }

    #[test]
    fn question_accepts_only_its_choices() {
        let q = Question::new(2, ["i", "ii", "iii"]).unwrap();
        assert!(q.accepts("ii"));
        assert!(!q.accepts("II"));
        assert!(!q.accepts("x"));
    }

    #[test]
    fn quiz_requires_two_questions() {
        let err = Quiz::new("Mid-term", "MT-1", CourseId(0), vec![question(1)]).unwrap_err();
        assert_eq!(err, QuizError::InvalidNumberOfQuestions { found: 1 });
    }

    #[test]
    fn quiz_rejects_duplicate_question_numbers() {
        let err = Quiz::new("Mid-term", "MT-1", CourseId(0), vec![question(1), question(1)])
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestion(_)));
    }

    #[test]
    fn new_quiz_starts_unset() {
        let quiz = Quiz::new("Mid-term", "MT-1", CourseId(3), vec![question(1), question(2)])
            .unwrap();
        assert_eq!(quiz.course, CourseId(3));
        assert!(quiz.student.is_none());
        assert!(!quiz.submitted && !quiz.marked && !quiz.teacher_graded);
        assert!(quiz.grade.is_none());
        assert_eq!(quiz.question(2).map(|q| q.number), Some(2));
        assert!(quiz.question(9).is_none());
    }

    #[test]
    fn fresh_students_do_not_share_lists() {
        let mut a = Student::new("John", "Snow", "HB256");
        let b = Student::new("Karl", "Drago", "HB250");
        a.enrolled_courses.push(CourseId(0));
        assert!(a.is_enrolled_in(CourseId(0)));
        assert!(!b.is_enrolled_in(CourseId(0)));
    }

    #[test]
    fn answers_keep_insertion_order() {
        let answers: Answers = vec![(2, "ii"), (1, "b"), (2, "iii")].into_iter().collect();
        let order: Vec<u32> = answers.iter().map(|e| e.question).collect();
        assert_eq!(order, vec![2, 1, 2]);
        assert_eq!(answers.len(), 3);
    }

    #[test]
    fn ids_display_with_entity_label() {
        assert_eq!(CourseId(4).to_string(), "course#4");
        assert_eq!(StudentId(0).to_string(), "student#0");
    }
}
