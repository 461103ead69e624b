//! The dashboard roll-up: streaks, XP and per-module completion, all
//! re-derived from stored rows on every call (no counters to drift).

use super::*;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_xp: i32,
    pub next_milestone: i32,
    pub module_progress: Vec<(String, i32)>,
}

pub fn dashboard_stats(conn: &PgConnection, user_id: i32, today: NaiveDate) -> Result<DashboardStats> {
    let streaks = streak::user_streaks(conn, user_id, today)?;
    let total_xp = xp::user_total_xp(conn, user_id)?;
    let module_progress = progress::module_progress(conn, user_id)?;

    Ok(DashboardStats {
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        total_xp,
        next_milestone: xp::next_milestone(total_xp),
        module_progress,
    })
}
