//! The quiz answering/grading flow. A `QuizSheet` is the in-memory state
//! machine the UI drives: answer in place, step forward only past answered
//! questions, step back freely, submit only when everything is answered.
//! Grading itself is pure; `submit_quiz` is the single place that turns a
//! grade into persisted rows.

use super::*;
use crate::schema::quiz_attempts;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
struct AnswerSnapshot<'a> {
    question_id: i32,
    answer: &'a str,
}

#[derive(Debug, Clone)]
pub struct QuizSheet {
    lesson_id: i32,
    passing_score: i32,
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<String>>,
    current: usize,
}

impl QuizSheet {
    /// Builds a sheet over a lesson's questions. Questions are put in
    /// presentation order; a quiz with no questions or a non-positive
    /// point weight is refused outright so grading can never divide by a
    /// zero total.
    pub fn new(lesson_id: i32,
               passing_score: i32,
               mut questions: Vec<QuizQuestion>)
               -> Result<QuizSheet> {
        if questions.is_empty() {
            return Err(ErrorKind::EmptyQuiz(lesson_id).into());
        }
        if questions.iter().any(|q| q.points < 1) {
            return Err(ErrorKind::DatabaseOdd("a quiz question with a non-positive point weight")
                .into());
        }
        questions.sort_by_key(|q| q.order_index);

        let answers = vec![None; questions.len()];
        Ok(QuizSheet { lesson_id, passing_score, questions, answers, current: 0 })
    }

    pub fn lesson_id(&self) -> i32 {
        self.lesson_id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.questions[self.current]
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    fn answered(&self, index: usize) -> bool {
        self.answers
            .get(index)
            .map(|a| a.as_ref().map_or(false, |a| !a.is_empty()))
            .unwrap_or(false)
    }

    /// Records an answer without moving the cursor; re-answering overwrites.
    pub fn answer(&mut self, index: usize, value: &str) -> Result<()> {
        if index >= self.questions.len() {
            return Err(ErrorKind::NoSuchQuestion(index).into());
        }
        self.answers[index] = Some(value.to_string());
        Ok(())
    }

    /// Advances to the next question; permitted only once the current one
    /// has a non-empty answer.
    pub fn next(&mut self) -> Result<usize> {
        if !self.answered(self.current) {
            return Err(ErrorKind::AnswerMissing(self.current).into());
        }
        if self.current + 1 >= self.questions.len() {
            return Err(ErrorKind::NoSuchQuestion(self.current + 1).into());
        }
        self.current += 1;
        Ok(self.current)
    }

    /// Steps back; always permitted except at the first question.
    pub fn prev(&mut self) -> Result<usize> {
        if self.current == 0 {
            return Err(ErrorKind::InvalidInput.into());
        }
        self.current -= 1;
        Ok(self.current)
    }

    pub fn is_complete(&self) -> bool {
        (0..self.questions.len()).all(|i| self.answered(i))
    }

    /// A fresh attempt over the same questions; earlier attempts stay in
    /// the store untouched.
    pub fn retry(&mut self) {
        for a in &mut self.answers {
            *a = None;
        }
        self.current = 0;
    }

    /// Grades the sheet. Only permitted once every question is answered.
    pub fn grade(&self) -> Result<Grade> {
        if let Some(missing) = (0..self.questions.len()).find(|&i| !self.answered(i)) {
            return Err(ErrorKind::AnswerMissing(missing).into());
        }

        let mut score = 0;
        let mut total = 0;
        for (q, a) in self.questions.iter().zip(&self.answers) {
            total += q.points;
            if a.as_ref().map(String::as_str) == Some(q.correct_answer.as_str()) {
                score += q.points;
            }
        }

        let percentage = (100.0 * f64::from(score) / f64::from(total)).round() as i32;
        Ok(Grade { score, total, percentage, passed: percentage >= self.passing_score })
    }

    fn answers_json(&self) -> Result<String> {
        let snapshot: Vec<AnswerSnapshot> = self.questions
            .iter()
            .zip(&self.answers)
            .map(|(q, a)| {
                AnswerSnapshot {
                    question_id: q.id,
                    answer: a.as_ref().map(String::as_str).unwrap_or(""),
                }
            })
            .collect();
        Ok(serde_json::to_string(&snapshot)?)
    }
}

/// Loads the answering sheet for a lesson's quiz, with the passing score
/// taken from the lesson's module.
pub fn sheet_for_lesson(conn: &PgConnection, lesson_id: i32) -> Result<QuizSheet> {
    use crate::schema::{modules, quiz_questions};

    let lesson = catalog::get_lesson(conn, lesson_id)?;
    let module: Module = modules::table.find(lesson.module_id).first(conn)?;

    let questions: Vec<QuizQuestion> = quiz_questions::table
        .filter(quiz_questions::lesson_id.eq(lesson_id))
        .order(quiz_questions::order_index.asc())
        .load(conn)?;

    QuizSheet::new(lesson_id, module.passing_score, questions)
}

/// Grades a completed sheet and persists the outcome: always appends one
/// QuizAttempt; on a pass also marks the lesson completed (bumping today's
/// streak) and issues any certificates that completion earned. A failed
/// attempt leaves the lesson's progress untouched, and re-passing an
/// already-passed quiz only appends another attempt row.
pub fn submit_quiz(conn: &PgConnection,
                   user_id: i32,
                   sheet: &QuizSheet)
                   -> Result<(QuizAttempt, Grade)> {
    let grade = sheet.grade()?;
    let answers = sheet.answers_json()?;

    let attempt: QuizAttempt = diesel::insert_into(quiz_attempts::table)
        .values(&NewQuizAttempt {
            user_id,
            lesson_id: sheet.lesson_id,
            score: grade.score,
            total: grade.total,
            percentage: grade.percentage,
            passed: grade.passed,
            answers: &answers,
        })
        .get_result(conn)
        .chain_err(|| "Couldn't save the quiz attempt!")?;

    info!("User {} scored {}/{} ({} %) on lesson {} quiz: {}.",
          user_id,
          grade.score,
          grade.total,
          grade.percentage,
          sheet.lesson_id,
          if grade.passed { "passed" } else { "failed" });

    if grade.passed {
        progress::mark_lesson_complete(conn, user_id, sheet.lesson_id)?;

        let lesson = catalog::get_lesson(conn, sheet.lesson_id)?;
        let module: Module = {
            use crate::schema::modules;
            modules::table.find(lesson.module_id).first(conn)?
        };
        certificate::maybe_issue_module_certificate(conn, user_id, &module)?;
        certificate::maybe_issue_course_certificate(conn, user_id)?;
    }

    Ok((attempt, grade))
}

/// A user's attempts on one lesson, newest first.
pub fn lesson_attempts(conn: &PgConnection,
                       user_id: i32,
                       lesson_id: i32)
                       -> Result<Vec<QuizAttempt>> {
    Ok(quiz_attempts::table
        .filter(quiz_attempts::user_id.eq(user_id))
        .filter(quiz_attempts::lesson_id.eq(lesson_id))
        .order(quiz_attempts::created_at.desc())
        .load(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i32, points: i32, order_index: i32, correct: &str) -> QuizQuestion {
        QuizQuestion {
            id,
            lesson_id: 7,
            question_text: format!("Q{}", id),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: correct.into(),
            points,
            order_index,
        }
    }

    fn sheet(questions: Vec<QuizQuestion>) -> QuizSheet {
        QuizSheet::new(7, 70, questions).unwrap()
    }

    #[test]
    fn a_quiz_needs_questions_with_positive_weights() {
        assert!(QuizSheet::new(7, 70, vec![]).is_err());
        assert!(QuizSheet::new(7, 70, vec![question(1, 0, 0, "a")]).is_err());
    }

    #[test]
    fn questions_are_presented_in_order_index_order() {
        let s = sheet(vec![question(2, 1, 1, "a"), question(1, 1, 0, "b")]);
        assert_eq!(s.current_question().id, 1);
    }

    #[test]
    fn next_requires_an_answer_first() {
        let mut s = sheet(vec![question(1, 1, 0, "a"), question(2, 1, 1, "b")]);
        assert!(s.next().is_err());
        s.answer(0, "a").unwrap();
        assert_eq!(s.next().unwrap(), 1);
        assert_eq!(s.prev().unwrap(), 0);
        assert!(s.prev().is_err());
    }

    #[test]
    fn an_empty_answer_does_not_unlock_next() {
        let mut s = sheet(vec![question(1, 1, 0, "a"), question(2, 1, 1, "b")]);
        s.answer(0, "").unwrap();
        assert!(s.next().is_err());
    }

    #[test]
    fn submit_gated_on_every_question_answered() {
        let mut s = sheet(vec![question(1, 1, 0, "a"), question(2, 1, 1, "b")]);
        s.answer(0, "a").unwrap();
        match s.grade() {
            Err(Error(ErrorKind::AnswerMissing(1), _)) => (),
            other => panic!("expected AnswerMissing(1), got {:?}", other),
        }
        s.answer(1, "c").unwrap();
        assert!(s.grade().is_ok());
    }

    #[test]
    fn seven_of_ten_points_is_70_percent() {
        let mut s = sheet(vec![question(1, 7, 0, "a"), question(2, 3, 1, "b")]);
        s.answer(0, "a").unwrap();
        s.answer(1, "c").unwrap();
        let grade = s.grade().unwrap();
        assert_eq!(grade, Grade { score: 7, total: 10, percentage: 70, passed: true });
    }

    #[test]
    fn two_of_three_rounds_to_67() {
        let mut s = sheet(vec![question(1, 1, 0, "a"),
                               question(2, 1, 1, "b"),
                               question(3, 1, 2, "c")]);
        s.answer(0, "a").unwrap();
        s.answer(1, "b").unwrap();
        s.answer(2, "a").unwrap();
        let grade = s.grade().unwrap();
        assert_eq!(grade.percentage, 67);
        assert!(!grade.passed);
    }

    #[test]
    fn half_a_percent_rounds_up() {
        // 5/8 = 62.5 % -> 63.
        let mut s = sheet(vec![question(1, 5, 0, "a"), question(2, 3, 1, "b")]);
        s.answer(0, "a").unwrap();
        s.answer(1, "a").unwrap();
        assert_eq!(s.grade().unwrap().percentage, 63);
    }

    #[test]
    fn passing_is_at_least_the_threshold() {
        let mut s = QuizSheet::new(7, 80, vec![question(1, 4, 0, "a"), question(2, 1, 1, "b")])
            .unwrap();
        s.answer(0, "a").unwrap();
        s.answer(1, "c").unwrap();
        let grade = s.grade().unwrap();
        assert_eq!(grade.percentage, 80);
        assert!(grade.passed);
    }

    #[test]
    fn grading_is_deterministic_across_resubmission() {
        let mut s = sheet(vec![question(1, 1, 0, "a")]);
        s.answer(0, "a").unwrap();
        assert_eq!(s.grade().unwrap(), s.grade().unwrap());
    }

    #[test]
    fn retry_clears_answers_and_rewinds() {
        let mut s = sheet(vec![question(1, 1, 0, "a"), question(2, 1, 1, "b")]);
        s.answer(0, "a").unwrap();
        s.next().unwrap();
        s.answer(1, "b").unwrap();
        s.retry();
        assert_eq!(s.current_index(), 0);
        assert!(!s.is_complete());
        assert!(s.next().is_err());
    }

    #[test]
    fn answers_snapshot_keeps_question_ids() {
        let mut s = sheet(vec![question(1, 1, 0, "a"), question(2, 1, 1, "b")]);
        s.answer(0, "a").unwrap();
        s.answer(1, "c").unwrap();
        let json: serde_json::Value = serde_json::from_str(&s.answers_json().unwrap()).unwrap();
        assert_eq!(json[0]["question_id"], 1);
        assert_eq!(json[1]["answer"], "c");
    }
}
