//! Per-lesson progress: the unlock/status derivation, the progress writes
//! (video position, activity and assignment responses, completion) and the
//! per-module completion roll-up.
//!
//! The derivations are pure functions over loaded rows; nothing here caches
//! anything between calls. Writes use Postgres upserts keyed on
//! (user, lesson) so that concurrent sessions degrade to last-write-wins
//! instead of read-modify-write races.

use super::*;
use crate::schema::lesson_progress;
use chrono::offset::Utc;
use diesel::pg::upsert::on_constraint;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LessonStatus {
    Locked,
    Available,
    InProgress,
    Completed,
}

fn is_completed(progress: &HashMap<i32, LessonProgress>, lesson_id: i32) -> bool {
    progress.get(&lesson_id).map(|p| p.completed).unwrap_or(false)
}

/// Derives the display status of `lessons[index]`. Lessons unlock strictly
/// in sequence order: the first lesson is always unlocked, later ones only
/// once their predecessor is completed. An absent progress row counts as
/// "not completed, zero video progress".
pub fn lesson_status(lessons: &[Lesson],
                     progress: &HashMap<i32, LessonProgress>,
                     index: usize)
                     -> LessonStatus {
    let lesson = &lessons[index];

    if is_completed(progress, lesson.id) {
        return LessonStatus::Completed;
    }

    let unlocked = index == 0 || is_completed(progress, lessons[index - 1].id);
    if !unlocked {
        return LessonStatus::Locked;
    }

    let video_progress = progress.get(&lesson.id).map(|p| p.video_progress).unwrap_or(0);
    if video_progress > 0 {
        LessonStatus::InProgress
    } else {
        LessonStatus::Available
    }
}

pub fn lesson_statuses(lessons: &[Lesson],
                       progress: &HashMap<i32, LessonProgress>)
                       -> Vec<LessonStatus> {
    (0..lessons.len()).map(|i| lesson_status(lessons, progress, i)).collect()
}

/// All of one user's progress rows, keyed by lesson id.
pub fn user_progress_map(conn: &PgConnection, user_id: i32) -> Result<HashMap<i32, LessonProgress>> {
    let rows: Vec<LessonProgress> = lesson_progress::table
        .filter(lesson_progress::user_id.eq(user_id))
        .load(conn)?;

    Ok(rows.into_iter().map(|p| (p.lesson_id, p)).collect())
}

pub fn completed_lesson_ids(conn: &PgConnection, user_id: i32) -> Result<HashSet<i32>> {
    let ids: Vec<i32> = lesson_progress::table
        .select(lesson_progress::lesson_id)
        .filter(lesson_progress::user_id.eq(user_id))
        .filter(lesson_progress::completed.eq(true))
        .load(conn)?;

    Ok(ids.into_iter().collect())
}

/// The lessons of one module zipped with their statuses for one user.
pub fn module_statuses(conn: &PgConnection,
                       user_id: i32,
                       module: &Module)
                       -> Result<Vec<(Lesson, LessonStatus)>> {
    use crate::schema::lessons;

    let lessons: Vec<Lesson> = lessons::table.filter(lessons::module_id.eq(module.id))
        .order(lessons::seq_no.asc())
        .load(conn)?;

    let progress = user_progress_map(conn, user_id)?;
    let statuses = lesson_statuses(&lessons, &progress);

    Ok(lessons.into_iter().zip(statuses).collect())
}

/// Records the last known video playback position. Never marks a lesson
/// complete and never touches an existing row's completion fields.
pub fn record_video_progress(conn: &PgConnection,
                             user_id: i32,
                             lesson_id: i32,
                             percent: i32)
                             -> Result<LessonProgress> {
    let percent = percent.max(0).min(100);
    let now = Utc::now();

    let row = LessonProgress {
        user_id,
        lesson_id,
        completed: false,
        completed_at: None,
        video_progress: percent,
        activity_response: None,
        assignment_response: None,
        updated_at: now,
    };

    Ok(diesel::insert_into(lesson_progress::table)
        .values(&row)
        .on_conflict(on_constraint("lesson_progress_pkey"))
        .do_update()
        .set((lesson_progress::video_progress.eq(percent),
              lesson_progress::updated_at.eq(now)))
        .get_result(conn)
        .chain_err(|| "Couldn't save the video position!")?)
}

/// Stores the learner's interactive-activity response after validating that
/// the lesson actually carries an activity of a well-formed shape.
pub fn save_activity_response(conn: &PgConnection,
                              user_id: i32,
                              lesson_id: i32,
                              response: &str)
                              -> Result<LessonProgress> {
    let lesson = catalog::get_lesson(conn, lesson_id)?;
    let config = activity::parse_lesson_activity(&lesson)?;
    if config.is_none() {
        warn!("User {} sent an activity response for lesson {} which has no activity.",
              user_id,
              lesson_id);
        return Err(ErrorKind::InvalidInput.into());
    }

    let now = Utc::now();
    let row = LessonProgress {
        user_id,
        lesson_id,
        completed: false,
        completed_at: None,
        video_progress: 0,
        activity_response: Some(response.to_string()),
        assignment_response: None,
        updated_at: now,
    };

    Ok(diesel::insert_into(lesson_progress::table)
        .values(&row)
        .on_conflict(on_constraint("lesson_progress_pkey"))
        .do_update()
        .set((lesson_progress::activity_response.eq(response),
              lesson_progress::updated_at.eq(now)))
        .get_result(conn)
        .chain_err(|| "Couldn't save the activity response!")?)
}

pub fn save_assignment_response(conn: &PgConnection,
                                user_id: i32,
                                lesson_id: i32,
                                response: &str)
                                -> Result<LessonProgress> {
    let now = Utc::now();
    let row = LessonProgress {
        user_id,
        lesson_id,
        completed: false,
        completed_at: None,
        video_progress: 0,
        activity_response: None,
        assignment_response: Some(response.to_string()),
        updated_at: now,
    };

    Ok(diesel::insert_into(lesson_progress::table)
        .values(&row)
        .on_conflict(on_constraint("lesson_progress_pkey"))
        .do_update()
        .set((lesson_progress::assignment_response.eq(response),
              lesson_progress::updated_at.eq(now)))
        .get_result(conn)
        .chain_err(|| "Couldn't save the assignment response!")?)
}

/// Marks a lesson completed (upsert: completed = true, video at 100 %) and
/// bumps today's streak day when this is a fresh completion. Returns the
/// written row and whether the completion was fresh. An already-completed
/// row keeps its original completion timestamp.
pub fn mark_lesson_complete(conn: &PgConnection,
                            user_id: i32,
                            lesson_id: i32)
                            -> Result<(LessonProgress, bool)> {
    use diesel::dsl::sql;
    use diesel::sql_types::{Nullable, Timestamptz};

    let already_completed: Option<bool> = lesson_progress::table
        .select(lesson_progress::completed)
        .filter(lesson_progress::user_id.eq(user_id))
        .filter(lesson_progress::lesson_id.eq(lesson_id))
        .get_result(conn)
        .optional()?;
    let fresh = !already_completed.unwrap_or(false);

    let now = Utc::now();
    let row = LessonProgress {
        user_id,
        lesson_id,
        completed: true,
        completed_at: Some(now),
        video_progress: 100,
        activity_response: None,
        assignment_response: None,
        updated_at: now,
    };

    let written: LessonProgress = diesel::insert_into(lesson_progress::table)
        .values(&row)
        .on_conflict(on_constraint("lesson_progress_pkey"))
        .do_update()
        .set((lesson_progress::completed.eq(true),
              lesson_progress::video_progress.eq(100),
              lesson_progress::updated_at.eq(now),
              lesson_progress::completed_at
                  .eq(sql::<Nullable<Timestamptz>>("COALESCE(lesson_progress.completed_at, now())"))))
        .get_result(conn)
        .chain_err(|| "Couldn't mark the lesson completed!")?;

    if fresh {
        // An accepted inconsistency window: if the streak bump fails, the
        // completion above stays written.
        streak::log_streak_day(conn, user_id, now.date().naive_utc())?;
        info!("User {} completed lesson {}.", user_id, lesson_id);
    } else {
        debug!("User {} re-completed lesson {}; leaving the old completion in place.",
               user_id,
               lesson_id);
    }

    Ok((written, fresh))
}

/// Rolls per-lesson completion up into per-module percentages, in course
/// order. A module with no lessons reports 0 %.
pub fn module_percentages(catalog: &[(Module, Vec<Lesson>)],
                          completed: &HashSet<i32>)
                          -> Vec<(String, i32)> {
    catalog.iter()
        .map(|&(ref module, ref lessons)| {
            let total = lessons.len();
            let done = lessons.iter().filter(|l| completed.contains(&l.id)).count();
            let percentage = if total == 0 {
                0
            } else {
                (100.0 * done as f64 / total as f64).round() as i32
            };
            (module.name.clone(), percentage)
        })
        .collect()
}

pub fn module_progress(conn: &PgConnection, user_id: i32) -> Result<Vec<(String, i32)>> {
    let catalog = catalog::course_catalog(conn)?;
    let completed = completed_lesson_ids(conn, user_id)?;
    Ok(module_percentages(&catalog, &completed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::offset::Utc;

    fn lesson(id: i32, module_id: i32, seq_no: i32) -> Lesson {
        Lesson {
            id,
            module_id,
            seq_no,
            title: format!("Lesson {}", seq_no),
            content: "".into(),
            activity_kind: None,
            activity_config: None,
        }
    }

    fn row(lesson_id: i32, completed: bool, video_progress: i32) -> LessonProgress {
        LessonProgress {
            user_id: 1,
            lesson_id,
            completed,
            completed_at: if completed { Some(Utc::now()) } else { None },
            video_progress,
            activity_response: None,
            assignment_response: None,
            updated_at: Utc::now(),
        }
    }

    fn module(id: i32, name: &str) -> Module {
        Module { id, name: name.into(), position: id, passing_score: 70 }
    }

    #[test]
    fn first_lesson_is_never_locked() {
        let lessons = vec![lesson(1, 1, 1), lesson(2, 1, 2)];
        let progress = HashMap::new();
        assert_eq!(lesson_status(&lessons, &progress, 0), LessonStatus::Available);
    }

    #[test]
    fn later_lessons_lock_until_predecessor_completes() {
        let lessons = vec![lesson(1, 1, 1), lesson(2, 1, 2), lesson(3, 1, 3)];
        let mut progress = HashMap::new();
        assert_eq!(lesson_status(&lessons, &progress, 1), LessonStatus::Locked);
        assert_eq!(lesson_status(&lessons, &progress, 2), LessonStatus::Locked);

        progress.insert(1, row(1, true, 100));
        assert_eq!(lesson_status(&lessons, &progress, 1), LessonStatus::Available);
        assert_eq!(lesson_status(&lessons, &progress, 2), LessonStatus::Locked);
    }

    #[test]
    fn video_progress_shows_in_progress_once_unlocked() {
        let lessons = vec![lesson(1, 1, 1), lesson(2, 1, 2)];
        let mut progress = HashMap::new();
        progress.insert(1, row(1, true, 100));
        progress.insert(2, row(2, false, 40));
        assert_eq!(lesson_status(&lessons, &progress, 1), LessonStatus::InProgress);
    }

    #[test]
    fn stale_video_progress_does_not_unlock() {
        // A lesson can't sneak out of locked just because a progress row
        // exists while its predecessor is incomplete.
        let lessons = vec![lesson(1, 1, 1), lesson(2, 1, 2)];
        let mut progress = HashMap::new();
        progress.insert(2, row(2, false, 40));
        assert_eq!(lesson_status(&lessons, &progress, 1), LessonStatus::Locked);
    }

    #[test]
    fn completed_wins_over_everything() {
        let lessons = vec![lesson(1, 1, 1), lesson(2, 1, 2)];
        let mut progress = HashMap::new();
        progress.insert(2, row(2, true, 100));
        assert_eq!(lesson_status(&lessons, &progress, 1), LessonStatus::Completed);
    }

    #[test]
    fn module_percentage_rounds_and_guards_empty_modules() {
        let catalog = vec![(module(1, "Foundations"),
                            (1..=6).map(|i| lesson(i, 1, i)).collect::<Vec<_>>()),
                           (module(2, "Empty"), vec![])];
        let completed: HashSet<i32> = [1, 2, 3].iter().cloned().collect();

        let percentages = module_percentages(&catalog, &completed);
        assert_eq!(percentages,
                   vec![("Foundations".to_string(), 50), ("Empty".to_string(), 0)]);
    }

    #[test]
    fn one_of_three_rounds_to_33() {
        let catalog = vec![(module(1, "M"), (1..=3).map(|i| lesson(i, 1, i)).collect::<Vec<_>>())];
        let completed: HashSet<i32> = [1].iter().cloned().collect();
        assert_eq!(module_percentages(&catalog, &completed)[0].1, 33);
    }
}
