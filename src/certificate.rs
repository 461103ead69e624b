//! Certificates, issued once per (user, course/module) completion event.
//! Numbers are human-readable: a fixed prefix, a UTC timestamp and a short
//! random tail so two certificates issued the same second still differ.

use super::*;
use crate::schema::certificates;
use chrono::offset::Utc;
use rand::Rng;

pub const COURSE_NAME: &str = "Leader Performance Academy";
pub const CERT_PREFIX: &str = "LPA";

pub fn certificate_number() -> String {
    use data_encoding::BASE32_NOPAD;

    let mut tail = [0_u8; 4];
    rand::thread_rng().fill(&mut tail);

    format!("{}-{}-{}",
            CERT_PREFIX,
            Utc::now().format("%Y%m%d%H%M%S"),
            BASE32_NOPAD.encode(&tail))
}

pub fn user_certificates(conn: &PgConnection, user_id: i32) -> Result<Vec<Certificate>> {
    Ok(certificates::table
        .filter(certificates::user_id.eq(user_id))
        .order(certificates::issued.asc())
        .load(conn)?)
}

fn existing(conn: &PgConnection,
            user_id: i32,
            module_name: Option<&str>)
            -> Result<Option<Certificate>> {
    let query = certificates::table
        .filter(certificates::user_id.eq(user_id))
        .filter(certificates::course_name.eq(COURSE_NAME));

    Ok(match module_name {
        Some(name) => {
            query.filter(certificates::module_name.eq(name))
                .first(conn)
                .optional()?
        }
        None => {
            query.filter(certificates::module_name.is_null())
                .first(conn)
                .optional()?
        }
    })
}

fn issue(conn: &PgConnection,
         user_id: i32,
         module_name: Option<&str>,
         final_score: i32)
         -> Result<Certificate> {
    let cert_number = certificate_number();

    let cert: Certificate = diesel::insert_into(certificates::table)
        .values(&NewCertificate {
            user_id,
            cert_number: &cert_number,
            course_name: COURSE_NAME,
            module_name,
            final_score,
        })
        .get_result(conn)
        .chain_err(|| "Couldn't issue the certificate!")?;

    info!("Issued certificate {} to user {} ({}).",
          cert.cert_number,
          user_id,
          module_name.unwrap_or("whole course"));
    Ok(cert)
}

/// The final score for a set of quiz lessons: the mean of the best passed
/// percentage per lesson, rounded. Lessons without quizzes don't count.
fn final_score_for_lessons(conn: &PgConnection, user_id: i32, lessons: &[Lesson]) -> Result<i32> {
    use crate::schema::quiz_attempts;

    let mut best = Vec::new();
    for lesson in lessons {
        let top: Option<i32> = quiz_attempts::table
            .select(quiz_attempts::percentage)
            .filter(quiz_attempts::user_id.eq(user_id))
            .filter(quiz_attempts::lesson_id.eq(lesson.id))
            .filter(quiz_attempts::passed.eq(true))
            .order(quiz_attempts::percentage.desc())
            .first(conn)
            .optional()?;
        if let Some(p) = top {
            best.push(p);
        }
    }

    if best.is_empty() {
        return Ok(100);
    }
    Ok((f64::from(best.iter().sum::<i32>()) / best.len() as f64).round() as i32)
}

/// Issues the module certificate if (and only if) every lesson of the
/// module is now completed and no certificate for it exists yet.
pub fn maybe_issue_module_certificate(conn: &PgConnection,
                                      user_id: i32,
                                      module: &Module)
                                      -> Result<Option<Certificate>> {
    use crate::schema::lessons;

    if existing(conn, user_id, Some(&module.name))?.is_some() {
        return Ok(None);
    }

    let module_lessons: Vec<Lesson> = lessons::table
        .filter(lessons::module_id.eq(module.id))
        .order(lessons::seq_no.asc())
        .load(conn)?;
    if module_lessons.is_empty() {
        return Ok(None);
    }

    let completed = progress::completed_lesson_ids(conn, user_id)?;
    if !module_lessons.iter().all(|l| completed.contains(&l.id)) {
        return Ok(None);
    }

    let score = final_score_for_lessons(conn, user_id, &module_lessons)?;
    issue(conn, user_id, Some(&module.name), score).map(Some)
}

/// Issues the whole-course certificate once every module is complete.
pub fn maybe_issue_course_certificate(conn: &PgConnection,
                                      user_id: i32)
                                      -> Result<Option<Certificate>> {
    if existing(conn, user_id, None)?.is_some() {
        return Ok(None);
    }

    let catalog = catalog::course_catalog(conn)?;
    if catalog.is_empty() {
        return Ok(None);
    }

    let completed = progress::completed_lesson_ids(conn, user_id)?;
    let all_lessons: Vec<Lesson> =
        catalog.iter().flat_map(|&(_, ref ls)| ls.iter().cloned()).collect();
    if all_lessons.is_empty() || !all_lessons.iter().all(|l| completed.contains(&l.id)) {
        return Ok(None);
    }

    let score = final_score_for_lessons(conn, user_id, &all_lessons)?;
    issue(conn, user_id, None, score).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_numbers_carry_the_prefix_and_a_tail() {
        let n = certificate_number();
        assert!(n.starts_with("LPA-"));
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 14);
        assert!(!parts[2].is_empty());
    }

    #[test]
    fn two_numbers_in_a_row_differ() {
        assert_ne!(certificate_number(), certificate_number());
    }
}
