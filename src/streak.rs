//! Daily activity streaks, derived from one row per (user, calendar day).
//! Both walks run over distinct dates sorted most-recent-first; nothing is
//! cached between calls.

use super::*;
use crate::schema::streak_days;
use chrono::{Duration, NaiveDate};
use diesel::pg::upsert::on_constraint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Length of the run of consecutive days ending today or yesterday. A most
/// recent activity day older than yesterday means the streak is broken.
pub fn current_streak(days_desc: &[NaiveDate], today: NaiveDate) -> u32 {
    let most_recent = match days_desc.first() {
        Some(&d) => d,
        None => return 0,
    };
    if most_recent != today && most_recent != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    for pair in days_desc.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// The longest run of consecutive days anywhere in the history. Never
/// reported smaller than the current streak.
pub fn longest_streak(days_desc: &[NaiveDate], today: NaiveDate) -> u32 {
    if days_desc.is_empty() {
        return 0;
    }

    let mut run = 1;
    let mut best = 1;
    for pair in days_desc.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best.max(current_streak(days_desc, today))
}

pub fn streaks(days_desc: &[NaiveDate], today: NaiveDate) -> Streaks {
    Streaks {
        current: current_streak(days_desc, today),
        longest: longest_streak(days_desc, today),
    }
}

/// Creates today's StreakDay row, or bumps its completion counter if the
/// user already completed a lesson today.
pub fn log_streak_day(conn: &PgConnection, user_id: i32, day: NaiveDate) -> Result<StreakDay> {
    let streak_day: StreakDay = diesel::insert_into(streak_days::table)
        .values(&NewStreakDay { user_id, day })
        .on_conflict(on_constraint("streak_days_pkey"))
        .do_update()
        .set(streak_days::lessons_completed.eq(streak_days::lessons_completed + 1))
        .get_result(conn)
        .chain_err(|| "Couldn't log the streak day!")?;

    debug!("User {} is at {} completions on {}.",
           user_id,
           streak_day.lessons_completed,
           streak_day.day);
    Ok(streak_day)
}

/// Loads the user's distinct activity dates most-recent-first and derives
/// both streaks.
pub fn user_streaks(conn: &PgConnection, user_id: i32, today: NaiveDate) -> Result<Streaks> {
    let days: Vec<NaiveDate> = streak_days::table
        .select(streak_days::day)
        .filter(streak_days::user_id.eq(user_id))
        .order(streak_days::day.desc())
        .load(conn)?;

    Ok(streaks(&days, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn no_activity_means_no_streaks() {
        let today = d("2024-01-05");
        assert_eq!(streaks(&[], today), Streaks { current: 0, longest: 0 });
    }

    #[test]
    fn contiguous_run_up_to_today() {
        let days = vec![d("2024-01-05"), d("2024-01-04"), d("2024-01-03"), d("2024-01-01")];
        let s = streaks(&days, d("2024-01-05"));
        assert_eq!(s, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn yesterday_still_counts_as_current() {
        let days = vec![d("2024-01-04"), d("2024-01-03")];
        assert_eq!(current_streak(&days, d("2024-01-05")), 2);
    }

    #[test]
    fn stale_single_day() {
        let days = vec![d("2024-01-01")];
        let s = streaks(&days, d("2024-01-10"));
        assert_eq!(s, Streaks { current: 0, longest: 1 });
    }

    #[test]
    fn old_long_run_beats_short_current_one() {
        let days = vec![d("2024-02-10"),
                        d("2024-01-04"),
                        d("2024-01-03"),
                        d("2024-01-02"),
                        d("2024-01-01")];
        let s = streaks(&days, d("2024-02-10"));
        assert_eq!(s, Streaks { current: 1, longest: 4 });
    }

    #[test]
    fn gap_right_before_most_recent_day() {
        let days = vec![d("2024-01-05"), d("2024-01-03"), d("2024-01-02")];
        let s = streaks(&days, d("2024-01-05"));
        assert_eq!(s, Streaks { current: 1, longest: 2 });
    }
}
