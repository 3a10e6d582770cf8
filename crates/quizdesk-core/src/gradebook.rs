//! In-memory gradebook owning every entity of one quiz workflow.
//!
//! Student operations live in [`crate::student`], teacher operations in
//! [`crate::teacher`]; both are `impl Gradebook` blocks over the storage
//! defined here.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{Course, CourseId, Quiz, QuizId, Student, StudentId, Teacher, TeacherId};

/// Arena of teachers, courses, quizzes and students.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gradebook {
    teachers: Vec<Teacher>,
    courses: Vec<Course>,
    quizzes: Vec<Quiz>,
    students: Vec<Student>,
}

impl Gradebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teacher.
    pub fn add_teacher(&mut self, teacher: Teacher) -> TeacherId {
        let id = TeacherId(self.teachers.len());
        tracing::debug!(%id, number = %teacher.teacher_number, "registered teacher");
        self.teachers.push(teacher);
        id
    }

    /// Register a student.
    pub fn add_student(&mut self, student: Student) -> StudentId {
        let id = StudentId(self.students.len());
        tracing::debug!(%id, number = %student.student_number, "registered student");
        self.students.push(student);
        id
    }

    /// Create a course offering taught by `teacher`.
    ///
    /// Fails with [`QuizError::InvalidCourseTeacher`] unless `teacher` is
    /// registered in this gradebook.
    pub fn create_course(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        semester: u32,
        teacher: TeacherId,
    ) -> Result<CourseId, QuizError> {
        if self.teacher(teacher).is_none() {
            return Err(QuizError::InvalidCourseTeacher(teacher.to_string()));
        }
        let id = CourseId(self.courses.len());
        let course = Course {
            name: name.into(),
            code: code.into(),
            semester,
            teacher,
            quizzes: Vec::new(),
            course_grade: None,
        };
        tracing::debug!(%id, code = %course.code, semester, "created course");
        self.courses.push(course);
        Ok(id)
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(id.0)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(id.0)
    }

    pub fn quiz(&self, id: QuizId) -> Option<&Quiz> {
        self.quizzes.get(id.0)
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.get(id.0)
    }

    pub fn teachers(&self) -> impl Iterator<Item = (TeacherId, &Teacher)> {
        self.teachers.iter().enumerate().map(|(i, t)| (TeacherId(i), t))
    }

    pub fn courses(&self) -> impl Iterator<Item = (CourseId, &Course)> {
        self.courses.iter().enumerate().map(|(i, c)| (CourseId(i), c))
    }

    pub fn quizzes(&self) -> impl Iterator<Item = (QuizId, &Quiz)> {
        self.quizzes.iter().enumerate().map(|(i, q)| (QuizId(i), q))
    }

    pub fn students(&self) -> impl Iterator<Item = (StudentId, &Student)> {
        self.students.iter().enumerate().map(|(i, s)| (StudentId(i), s))
    }

    // Checked accessors used by the operations. Each maps a dangling id to the
    // matching `Invalid*` error.

    pub(crate) fn course_or_err(&self, id: CourseId) -> Result<&Course, QuizError> {
        self.courses.get(id.0).ok_or_else(|| QuizError::InvalidCourse(id.to_string()))
    }

    pub(crate) fn course_mut_or_err(&mut self, id: CourseId) -> Result<&mut Course, QuizError> {
        self.courses.get_mut(id.0).ok_or_else(|| QuizError::InvalidCourse(id.to_string()))
    }

    pub(crate) fn quiz_or_err(&self, id: QuizId) -> Result<&Quiz, QuizError> {
        self.quizzes.get(id.0).ok_or_else(|| QuizError::InvalidQuiz(id.to_string()))
    }

    pub(crate) fn quiz_mut_or_err(&mut self, id: QuizId) -> Result<&mut Quiz, QuizError> {
        self.quizzes.get_mut(id.0).ok_or_else(|| QuizError::InvalidQuiz(id.to_string()))
    }

    pub(crate) fn student_or_err(&self, id: StudentId) -> Result<&Student, QuizError> {
        self.students.get(id.0).ok_or_else(|| QuizError::InvalidStudent(id.to_string()))
    }

    pub(crate) fn student_mut_or_err(&mut self, id: StudentId) -> Result<&mut Student, QuizError> {
        self.students.get_mut(id.0).ok_or_else(|| QuizError::InvalidStudent(id.to_string()))
    }

    pub(crate) fn push_quiz(&mut self, quiz: Quiz) -> QuizId {
        let id = QuizId(self.quizzes.len());
        self.quizzes.push(quiz);
        id
    }
}
