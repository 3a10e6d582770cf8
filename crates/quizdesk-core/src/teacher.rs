//! Teacher operations: create, assign, mark, grade, and the course grade.
//!
//! Teachers hold no domain state, so these operations take the entities they
//! act on explicitly.

use crate::error::QuizError;
use crate::gradebook::Gradebook;
use crate::grading::{quiz_percentage, truncated_mean, LetterGrade};
use crate::model::{CourseId, MarkingGuide, Question, Quiz, QuizId, StudentId};

impl Gradebook {
    /// Create a quiz in `course` and append it to the course's quizzes.
    pub fn create_quiz(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        course: CourseId,
        questions: Vec<Question>,
    ) -> Result<QuizId, QuizError> {
        self.course_or_err(course)?;
        let quiz = Quiz::new(name, code, course, questions)?;
        let question_count = quiz.questions.len();
        let id = self.push_quiz(quiz);
        self.course_mut_or_err(course)?.quizzes.push(id);

        tracing::debug!(quiz = %id, %course, questions = question_count, "created quiz");
        Ok(id)
    }

    /// Assign `quiz` to `student`.
    ///
    /// Reassignment is allowed at any point, including after submission.
    pub fn assign_quiz(&mut self, quiz: QuizId, student: StudentId) -> Result<QuizId, QuizError> {
        self.quiz_or_err(quiz)?;
        self.student_or_err(student)?;

        let target = self.quiz_mut_or_err(quiz)?;
        let previous = target.student.replace(student);

        if let Some(previous) = previous.filter(|p| *p != student) {
            self.student_mut_or_err(previous)?
                .assigned_quizzes
                .retain(|q| *q != quiz);
        }
        let assignee = self.student_mut_or_err(student)?;
        if !assignee.assigned_quizzes.contains(&quiz) {
            assignee.assigned_quizzes.push(quiz);
        }

        tracing::debug!(%quiz, %student, "assigned quiz");
        Ok(quiz)
    }

    /// Mark a submitted quiz against `guide`.
    ///
    /// A question is correct when the guide has an entry for its number equal
    /// to the recorded answer. Correct results are never reset. The quiz only
    /// becomes marked once a guide entry has been processed, so an empty guide
    /// leaves it unmarked.
    pub fn mark_quiz(&mut self, quiz: QuizId, guide: &MarkingGuide) -> Result<(), QuizError> {
        let target = self.quiz_mut_or_err(quiz)?;
        if !target.submitted {
            return Err(QuizError::UnsubmittedQuiz(quiz));
        }
        if guide.is_empty() {
            tracing::warn!(%quiz, "empty marking guide, quiz stays unmarked");
        }

        for entry in guide.iter() {
            for question in target.questions.iter_mut() {
                if question.number == entry.question
                    && question.answer.as_deref() == Some(entry.choice.as_str())
                {
                    question.answer_result = true;
                }
            }
            target.marked = true;
        }

        tracing::debug!(%quiz, correct = target.correct_count(), marked = target.marked, "marked quiz");
        Ok(())
    }

    /// Grade a marked quiz as the truncated percentage of correct answers.
    pub fn grade_quiz(&mut self, quiz: QuizId) -> Result<u32, QuizError> {
        let target = self.quiz_mut_or_err(quiz)?;
        if !target.marked {
            return Err(QuizError::UnmarkedQuiz(quiz));
        }

        let grade = quiz_percentage(target.correct_count(), target.questions.len());
        target.grade = Some(grade);
        target.teacher_graded = true;

        tracing::debug!(%quiz, grade, "graded quiz");
        Ok(grade)
    }

    /// Derive the course letter grade from `student`'s graded quizzes in `course`.
    ///
    /// Averages the grades of quizzes in the course that are assigned to the
    /// student and teacher-graded, truncates, and stores the letter on the
    /// course. Fails with [`QuizError::NoGradedQuizzes`] when there is nothing
    /// to average.
    pub fn calculate_total_grade(
        &mut self,
        student: StudentId,
        course: CourseId,
    ) -> Result<LetterGrade, QuizError> {
        let enrolled = self.student_or_err(student)?;
        let offering = self.course_or_err(course)?;
        if !enrolled.is_enrolled_in(course) {
            return Err(QuizError::UnEnrolledCourse {
                student_number: enrolled.student_number.clone(),
                course_code: offering.code.clone(),
            });
        }

        let grades: Vec<u32> = offering
            .quizzes
            .iter()
            .filter_map(|id| self.quiz(*id))
            .filter(|q| q.student == Some(student) && q.teacher_graded)
            .filter_map(|q| q.grade)
            .collect();

        let average = truncated_mean(&grades).ok_or_else(|| QuizError::NoGradedQuizzes {
            student_number: enrolled.student_number.clone(),
            course_code: offering.code.clone(),
        })?;
        let letter = LetterGrade::from_score(average).ok_or(QuizError::GradeOutOfRange(average))?;

        self.course_mut_or_err(course)?.course_grade = Some(letter);
        tracing::debug!(%student, %course, average, grade = %letter, "calculated course grade");
        Ok(letter)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::QuizError;
    use crate::gradebook::Gradebook;
    use crate::grading::LetterGrade;
    use crate::model::{
        Answers, CourseId, MarkingGuide, Question, QuizId, Student, StudentId, Teacher, TeacherId,
    };

    fn questions() -> Vec<Question> {
        vec![
            Question::new(1, ["a", "b", "c", "d"]).unwrap(),
            Question::new(2, ["i", "ii", "iii"]).unwrap(),
        ]
    }

    fn setup() -> (Gradebook, TeacherId, CourseId, StudentId) {
        let mut book = Gradebook::new();
        let teacher = book.add_teacher(Teacher::new("John", "Doe", "TR25"));
        let student = book.add_student(Student::new("John", "Snow", "HB256"));
        let course = book.create_course("Math", "HBZ5", 1, teacher).unwrap();
        (book, teacher, course, student)
    }

    /// Assign, answer, and submit a fresh quiz for `student`.
    fn submitted_quiz(book: &mut Gradebook, course: CourseId, student: StudentId) -> QuizId {
        let quiz = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();
        book.assign_quiz(quiz, student).unwrap();
        book.answer_quiz(student, quiz, &Answers::new().with(1, "b").with(2, "ii"))
            .unwrap();
        book.submit_quiz(student, quiz).unwrap();
        quiz
    }

    fn guide() -> MarkingGuide {
        Answers::new().with(1, "b").with(2, "iii")
    }

    #[test]
    fn create_quiz_appends_to_course() {
        let (mut book, _, course, _) = setup();
        let quiz = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();
        assert_eq!(book.course(course).unwrap().quizzes, vec![quiz]);
        assert_eq!(book.quiz(quiz).unwrap().name, "Mid-term");
    }

    #[test]
    fn create_quiz_validation() {
        let (mut book, _, course, _) = setup();
        let err = book
            .create_quiz("Mid-term", "MT-1", CourseId(5), questions())
            .unwrap_err();
        assert_eq!(err, QuizError::InvalidCourse("course#5".into()));

        let err = book
            .create_quiz("Mid-term", "MT-1", course, questions().into_iter().take(1).collect())
            .unwrap_err();
        assert_eq!(err, QuizError::InvalidNumberOfQuestions { found: 1 });
        assert!(book.course(course).unwrap().quizzes.is_empty());
    }

    #[test]
    fn assign_validation_and_reassignment() {
        let (mut book, _, course, snow) = setup();
        let drago = book.add_student(Student::new("Karl", "Drago", "HB250"));
        let quiz = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();

        assert_eq!(
            book.assign_quiz(QuizId(3), snow).unwrap_err(),
            QuizError::InvalidQuiz("quiz#3".into())
        );
        assert_eq!(
            book.assign_quiz(quiz, StudentId(9)).unwrap_err(),
            QuizError::InvalidStudent("student#9".into())
        );

        assert_eq!(book.assign_quiz(quiz, snow).unwrap(), quiz);
        assert_eq!(book.quiz(quiz).unwrap().student, Some(snow));
        assert_eq!(book.student(snow).unwrap().assigned_quizzes, vec![quiz]);

        book.assign_quiz(quiz, drago).unwrap();
        assert_eq!(book.quiz(quiz).unwrap().student, Some(drago));
        assert!(book.student(snow).unwrap().assigned_quizzes.is_empty());
        assert_eq!(book.student(drago).unwrap().assigned_quizzes, vec![quiz]);
    }

    #[test]
    fn mark_requires_submission() {
        let (mut book, _, course, _) = setup();
        let quiz = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();
        assert_eq!(
            book.mark_quiz(QuizId(8), &guide()).unwrap_err(),
            QuizError::InvalidQuiz("quiz#8".into())
        );
        assert_eq!(
            book.mark_quiz(quiz, &guide()).unwrap_err(),
            QuizError::UnsubmittedQuiz(quiz)
        );
    }

    #[test]
    fn mark_sets_results_per_question() {
        let (mut book, _, course, student) = setup();
        let quiz = submitted_quiz(&mut book, course, student);

        book.mark_quiz(quiz, &guide()).unwrap();
        let marked = book.quiz(quiz).unwrap();
        assert!(marked.questions[0].answer_result);
        assert!(!marked.questions[1].answer_result);
        assert!(marked.marked);
    }

    #[test]
    fn empty_guide_leaves_quiz_unmarked() {
        let (mut book, _, course, student) = setup();
        let quiz = submitted_quiz(&mut book, course, student);

        book.mark_quiz(quiz, &MarkingGuide::new()).unwrap();
        assert!(!book.quiz(quiz).unwrap().marked);
        assert_eq!(
            book.grade_quiz(quiz).unwrap_err(),
            QuizError::UnmarkedQuiz(quiz)
        );
    }

    #[test]
    fn remarking_never_clears_a_correct_result() {
        let (mut book, _, course, student) = setup();
        let quiz = submitted_quiz(&mut book, course, student);

        book.mark_quiz(quiz, &guide()).unwrap();
        book.mark_quiz(quiz, &Answers::new().with(1, "a")).unwrap();
        assert!(book.quiz(quiz).unwrap().questions[0].answer_result);
    }

    #[test]
    fn unanswered_questions_are_wrong() {
        let (mut book, _, course, student) = setup();
        let quiz = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();
        book.assign_quiz(quiz, student).unwrap();
        book.submit_quiz(student, quiz).unwrap();

        book.mark_quiz(quiz, &guide()).unwrap();
        assert_eq!(book.grade_quiz(quiz).unwrap(), 0);
    }

    #[test]
    fn grade_requires_marking() {
        let (mut book, _, course, student) = setup();
        let quiz = submitted_quiz(&mut book, course, student);
        assert_eq!(
            book.grade_quiz(quiz).unwrap_err(),
            QuizError::UnmarkedQuiz(quiz)
        );

        book.mark_quiz(quiz, &guide()).unwrap();
        assert_eq!(book.grade_quiz(quiz).unwrap(), 50);
        let graded = book.quiz(quiz).unwrap();
        assert_eq!(graded.grade, Some(50));
        assert!(graded.teacher_graded);
    }

    #[test]
    fn total_grade_from_single_quiz() {
        let (mut book, _, course, student) = setup();
        book.enroll_into_course(student, course).unwrap();
        let quiz = submitted_quiz(&mut book, course, student);
        book.mark_quiz(quiz, &guide()).unwrap();
        book.grade_quiz(quiz).unwrap();

        let letter = book.calculate_total_grade(student, course).unwrap();
        assert_eq!(letter, LetterGrade::D);
        assert_eq!(book.course(course).unwrap().course_grade, Some(LetterGrade::D));
    }

    #[test]
    fn total_grade_averages_only_own_graded_quizzes() {
        let (mut book, _, course, student) = setup();
        let other = book.add_student(Student::new("Karl", "Drago", "HB250"));
        book.enroll_into_course(student, course).unwrap();

        let perfect = submitted_quiz(&mut book, course, student);
        book.mark_quiz(perfect, &Answers::new().with(1, "b").with(2, "ii"))
            .unwrap();
        book.grade_quiz(perfect).unwrap();

        let half = submitted_quiz(&mut book, course, student);
        book.mark_quiz(half, &guide()).unwrap();
        book.grade_quiz(half).unwrap();

        // Submitted and marked but never graded: ignored.
        let ungraded = submitted_quiz(&mut book, course, student);
        book.mark_quiz(ungraded, &MarkingGuide::new().with(1, "z")).unwrap();

        // Someone else's zero: ignored.
        let theirs = book.create_quiz("Mid-term", "MT-1", course, questions()).unwrap();
        book.assign_quiz(theirs, other).unwrap();
        book.submit_quiz(other, theirs).unwrap();
        book.mark_quiz(theirs, &guide()).unwrap();
        book.grade_quiz(theirs).unwrap();

        // (100 + 50) / 2 = 75
        assert_eq!(
            book.calculate_total_grade(student, course).unwrap(),
            LetterGrade::B
        );
    }

    #[test]
    fn total_grade_enrollment_checks() {
        let (mut book, teacher, course, student) = setup();
        let science = book.create_course("Science", "HBS4", 2, teacher).unwrap();
        let math_next = book.create_course("Math", "HBZ5", 2, teacher).unwrap();
        book.enroll_into_course(student, course).unwrap();

        assert_eq!(
            book.calculate_total_grade(StudentId(9), course).unwrap_err(),
            QuizError::InvalidStudent("student#9".into())
        );
        assert_eq!(
            book.calculate_total_grade(student, CourseId(9)).unwrap_err(),
            QuizError::InvalidCourse("course#9".into())
        );
        assert!(matches!(
            book.calculate_total_grade(student, science).unwrap_err(),
            QuizError::UnEnrolledCourse { .. }
        ));
        assert!(matches!(
            book.calculate_total_grade(student, math_next).unwrap_err(),
            QuizError::UnEnrolledCourse { .. }
        ));
    }

    #[test]
    fn total_grade_without_graded_quizzes() {
        let (mut book, _, course, student) = setup();
        book.enroll_into_course(student, course).unwrap();
        submitted_quiz(&mut book, course, student);

        let err = book.calculate_total_grade(student, course).unwrap_err();
        assert!(matches!(err, QuizError::NoGradedQuizzes { .. }));
        assert!(book.course(course).unwrap().course_grade.is_none());
    }
}
