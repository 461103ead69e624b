//! User profiles, roles and the discovery questionnaire. Authentication
//! itself lives in an external service; every operation here takes the
//! already-resolved user id.

use super::*;
use crate::schema::{discovery_answers, user_profiles, user_roles};

pub fn get_profile(conn: &PgConnection, user_id: i32) -> Result<Option<UserProfile>> {
    Ok(user_profiles::table.find(user_id).first(conn).optional()?)
}

/// Creates or overwrites the profile row for this user.
pub fn upsert_profile(conn: &PgConnection, profile: &UserProfile) -> Result<UserProfile> {
    use diesel::pg::upsert::on_constraint;

    Ok(diesel::insert_into(user_profiles::table)
        .values(profile)
        .on_conflict(on_constraint("user_profiles_pkey"))
        .do_update()
        .set(profile)
        .get_result(conn)
        .chain_err(|| "Couldn't save the user profile!")?)
}

pub fn get_user_roles(conn: &PgConnection, user_id: i32) -> Result<Vec<String>> {
    Ok(user_roles::table
        .select(user_roles::role)
        .filter(user_roles::user_id.eq(user_id))
        .load(conn)?)
}

pub fn grant_role(conn: &PgConnection, user_id: i32, role: &str) -> Result<()> {
    diesel::insert_into(user_roles::table)
        .values(&UserRole { user_id, role: role.to_string() })
        .on_conflict_do_nothing()
        .execute(conn)
        .chain_err(|| "Couldn't grant the role!")?;
    Ok(())
}

pub fn has_role(conn: &PgConnection, user_id: i32, role: &str) -> Result<bool> {
    let hit: Option<UserRole> = user_roles::table
        .find((user_id, role))
        .first(conn)
        .optional()?;
    Ok(hit.is_some())
}

pub fn require_role(conn: &PgConnection, user_id: i32, role: &str) -> Result<()> {
    if has_role(conn, user_id, role)? {
        Ok(())
    } else {
        warn!("User {} tried an action that needs the {:?} role.", user_id, role);
        Err(ErrorKind::AccessDenied.into())
    }
}

pub fn save_discovery_answer(conn: &PgConnection,
                             user_id: i32,
                             question_key: &str,
                             answer: &str)
                             -> Result<DiscoveryAnswer> {
    Ok(diesel::insert_into(discovery_answers::table)
        .values(&NewDiscoveryAnswer { user_id, question_key, answer })
        .get_result(conn)
        .chain_err(|| "Couldn't save the questionnaire answer!")?)
}

/// The user's questionnaire answers in the order they were given.
pub fn discovery_answers(conn: &PgConnection, user_id: i32) -> Result<Vec<DiscoveryAnswer>> {
    Ok(discovery_answers::table
        .filter(discovery_answers::user_id.eq(user_id))
        .order(discovery_answers::created_at.asc())
        .load(conn)?)
}
