//! Lesson catalog resolution: modules in course order, each module's lessons
//! in sequence order, each lesson with its ordered quiz questions. The
//! catalog is authored out of band (see `bin/seed.rs`) and read-only from
//! the learner's point of view.

use super::*;

pub const DEFAULT_PASSING_SCORE: i32 = 70;
pub const FINAL_EXAM_PASSING_SCORE: i32 = 80;

pub fn get_module_by_name(conn: &PgConnection, module_name: &str) -> Result<Module> {
    use crate::schema::modules;
    use diesel::result::Error::NotFound;

    modules::table.filter(modules::name.eq(module_name))
        .first(conn)
        .map_err(|e| match e {
            NotFound => ErrorKind::NoSuchModule(module_name.into()).into(),
            e => Error::from(e),
        })
}

pub fn get_lesson(conn: &PgConnection, lesson_id: i32) -> Result<Lesson> {
    use crate::schema::lessons;
    use diesel::result::Error::NotFound;

    lessons::table.filter(lessons::id.eq(lesson_id))
        .first(conn)
        .map_err(|e| match e {
            NotFound => ErrorKind::NoSuchLesson(lesson_id).into(),
            e => Error::from(e),
        })
}

/// The ordered lesson list of one module, each lesson zipped with its quiz
/// questions in presentation order.
pub fn module_lessons(conn: &PgConnection,
                      module: &Module)
                      -> Result<Vec<(Lesson, Vec<QuizQuestion>)>> {
    use crate::schema::{lessons, quiz_questions};

    let lessons: Vec<Lesson> = lessons::table.filter(lessons::module_id.eq(module.id))
        .order(lessons::seq_no.asc())
        .load(conn)?;

    let questions = if !lessons.is_empty() {
        QuizQuestion::belonging_to(&lessons).order(quiz_questions::order_index.asc())
            .load::<QuizQuestion>(conn)?
            .grouped_by(&lessons)
    } else {
        vec![]
    };

    Ok(lessons.into_iter().zip(questions).collect())
}

/// Every module of the course with its lessons, in course order.
pub fn course_catalog(conn: &PgConnection) -> Result<Vec<(Module, Vec<Lesson>)>> {
    use crate::schema::{modules, lessons};

    let mods: Vec<Module> = modules::table.order(modules::position.asc()).load(conn)?;

    let lessons = if !mods.is_empty() {
        Lesson::belonging_to(&mods).order(lessons::seq_no.asc())
            .load::<Lesson>(conn)?
            .grouped_by(&mods)
    } else {
        vec![]
    };

    Ok(mods.into_iter().zip(lessons).collect())
}

pub fn create_module(conn: &PgConnection,
                     name: &str,
                     position: i32,
                     passing_score: i32)
                     -> Result<Module> {
    use crate::schema::modules;

    if !(0..=100).contains(&passing_score) {
        return Err(ErrorKind::InvalidInput.into());
    }

    let module: Module = diesel::insert_into(modules::table)
        .values(&NewModule { name, position, passing_score })
        .get_result(conn)
        .chain_err(|| "Couldn't create a new module!")?;

    info!("Created module {:?} (passing score {} %).", module.name, module.passing_score);
    Ok(module)
}

pub fn create_lesson(conn: &PgConnection, new_lesson: NewLesson) -> Result<Lesson> {
    use crate::schema::lessons;

    if new_lesson.seq_no < 1 {
        return Err(ErrorKind::InvalidInput.into());
    }

    // Reject malformed activity payloads right at authoring time.
    activity::parse_activity(new_lesson.activity_kind, new_lesson.activity_config)?;

    let lesson: Lesson = diesel::insert_into(lessons::table)
        .values(&new_lesson)
        .get_result(conn)
        .chain_err(|| "Couldn't create a new lesson!")?;

    info!("Created lesson {} {:?}.", lesson.seq_no, lesson.title);
    Ok(lesson)
}

pub fn add_quiz_question(conn: &PgConnection, new_q: NewQuizQuestion) -> Result<QuizQuestion> {
    use crate::schema::quiz_questions;

    if new_q.points < 1 || new_q.options.is_empty() {
        return Err(ErrorKind::InvalidInput.into());
    }
    if !new_q.options.iter().any(|o| o == new_q.correct_answer) {
        warn!("Question for lesson {} has a correct answer that isn't among its options!",
              new_q.lesson_id);
        return Err(ErrorKind::InvalidInput.into());
    }

    let question: QuizQuestion = diesel::insert_into(quiz_questions::table)
        .values(&new_q)
        .get_result(conn)
        .chain_err(|| "Couldn't create a new quiz question!")?;

    Ok(question)
}
