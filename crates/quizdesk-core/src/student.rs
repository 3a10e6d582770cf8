//! Student operations: enroll, answer, submit.

use crate::error::QuizError;
use crate::gradebook::Gradebook;
use crate::model::{Answers, CourseId, QuizId, StudentId};

impl Gradebook {
    /// Enroll `student` into `course`.
    ///
    /// Enrollment is per course offering: the same id cannot be enrolled twice.
    pub fn enroll_into_course(
        &mut self,
        student: StudentId,
        course: CourseId,
    ) -> Result<(), QuizError> {
        self.student_or_err(student)?;
        let course_code = self.course_or_err(course)?.code.clone();

        let enrolled = self.student_mut_or_err(student)?;
        if enrolled.is_enrolled_in(course) {
            return Err(QuizError::AlreadyEnrolled {
                student_number: enrolled.student_number.clone(),
                course_code,
            });
        }
        enrolled.enrolled_courses.push(course);

        tracing::debug!(%student, %course, code = %course_code, "enrolled student");
        Ok(())
    }

    /// Record `answers` on a quiz assigned to `student`.
    ///
    /// Entries are applied in order. The first choice that is not among its
    /// question's choices aborts the call with [`QuizError::InvalidChoice`];
    /// entries applied before it are kept. Entries for unknown question
    /// numbers are ignored.
    pub fn answer_quiz(
        &mut self,
        student: StudentId,
        quiz: QuizId,
        answers: &Answers,
    ) -> Result<(), QuizError> {
        self.verify_assignee(student, quiz)?;

        let target = self.quiz_mut_or_err(quiz)?;
        for entry in answers.iter() {
            for question in target
                .questions
                .iter_mut()
                .filter(|q| q.number == entry.question)
            {
                if !question.accepts(&entry.choice) {
                    return Err(QuizError::InvalidChoice {
                        question: question.number,
                        choice: entry.choice.clone(),
                    });
                }
                question.answer = Some(entry.choice.clone());
            }
        }

        tracing::debug!(%student, %quiz, entries = answers.len(), "answered quiz");
        Ok(())
    }

    /// Mark a quiz assigned to `student` as submitted. Unanswered questions are allowed.
    pub fn submit_quiz(&mut self, student: StudentId, quiz: QuizId) -> Result<(), QuizError> {
        self.verify_assignee(student, quiz)?;
        self.quiz_mut_or_err(quiz)?.submitted = true;
        tracing::debug!(%student, %quiz, "submitted quiz");
        Ok(())
    }

    /// The quiz must exist, be assigned, and be assigned to a student with the
    /// acting student's number.
    fn verify_assignee(&self, student: StudentId, quiz: QuizId) -> Result<(), QuizError> {
        let acting = self.student_or_err(student)?;
        let target = self.quiz_or_err(quiz)?;
        let assigned_id = target.student.ok_or(QuizError::UnassignedQuiz(quiz))?;
        let assigned = self.student_or_err(assigned_id)?;
        if assigned.student_number != acting.student_number {
            return Err(QuizError::InvalidVerification {
                assigned: assigned.student_number.clone(),
                acting: acting.student_number.clone(),
            });
        }
        Ok(())
    }
}
