//! Experience points, recomputed on demand from the completed-lesson rows.
//! A lesson is worth 25 XP plus 5 per step of its position in its module.

use super::*;

pub const BASE_XP: i32 = 25;
pub const XP_STEP: i32 = 5;
pub const MILESTONE_STEP: i32 = 100;

/// `seq_no` is the lesson's 1-based position within its module.
pub fn lesson_xp(seq_no: i32) -> i32 {
    BASE_XP + (seq_no - 1) * XP_STEP
}

pub fn total_xp(completed_seq_nos: &[i32]) -> i32 {
    completed_seq_nos.iter().cloned().map(lesson_xp).sum()
}

/// The next goal shown next to the XP counter. Always strictly above the
/// current total: at an exact multiple of 100 the next milestone is the
/// following one, not the total itself.
pub fn next_milestone(total: i32) -> i32 {
    if total % MILESTONE_STEP == 0 {
        total + MILESTONE_STEP
    } else {
        (total / MILESTONE_STEP + 1) * MILESTONE_STEP
    }
}

/// Sums the XP of the user's completed lessons across the whole course.
pub fn user_total_xp(conn: &PgConnection, user_id: i32) -> Result<i32> {
    use crate::schema::{lessons, lesson_progress};

    // Sequence numbers live on the catalog side, so join through it rather
    // than trusting anything denormalized onto the progress rows.
    let seq_nos: Vec<i32> = lessons::table
        .inner_join(lesson_progress::table)
        .select(lessons::seq_no)
        .filter(lesson_progress::user_id.eq(user_id))
        .filter(lesson_progress::completed.eq(true))
        .load(conn)?;

    Ok(total_xp(&seq_nos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_grows_linearly_with_module_position() {
        assert_eq!(lesson_xp(1), 25);
        assert_eq!(lesson_xp(2), 30);
        assert_eq!(lesson_xp(3), 35);
    }

    #[test]
    fn first_three_lessons_total_90() {
        assert_eq!(total_xp(&[1, 2, 3]), 90);
    }

    #[test]
    fn milestone_is_the_next_hundred() {
        assert_eq!(next_milestone(0), 100);
        assert_eq!(next_milestone(90), 100);
        assert_eq!(next_milestone(101), 200);
    }

    #[test]
    fn milestone_at_an_exact_multiple_is_strictly_ahead() {
        assert_eq!(next_milestone(100), 200);
        assert_eq!(next_milestone(300), 400);
    }
}
