use super::schema::*;
use chrono::{DateTime, offset::Utc, NaiveDate};
use serde::{Serialize, Deserialize};

#[derive(Identifiable, Clone, Queryable, Debug, Associations, AsChangeset, Serialize)]
pub struct Module {
    pub id: i32,
    pub name: String,
    pub position: i32,
    pub passing_score: i32,
}

#[derive(Insertable)]
#[table_name = "modules"]
pub struct NewModule<'a> {
    pub name: &'a str,
    pub position: i32,
    pub passing_score: i32,
}

#[derive(Identifiable, Clone, Queryable, Debug, Associations, AsChangeset, Serialize)]
#[belongs_to(Module, foreign_key = "module_id")]
pub struct Lesson {
    pub id: i32,
    pub module_id: i32,
    pub seq_no: i32,
    pub title: String,
    pub content: String,
    pub activity_kind: Option<String>,
    pub activity_config: Option<String>,
}

#[derive(Insertable)]
#[table_name = "lessons"]
pub struct NewLesson<'a> {
    pub module_id: i32,
    pub seq_no: i32,
    pub title: &'a str,
    pub content: &'a str,
    pub activity_kind: Option<&'a str>,
    pub activity_config: Option<&'a str>,
}

#[derive(Identifiable, Clone, Queryable, Debug, Associations, AsChangeset, Serialize)]
#[belongs_to(Lesson, foreign_key = "lesson_id")]
pub struct QuizQuestion {
    pub id: i32,
    pub lesson_id: i32,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: i32,
    pub order_index: i32,
}

#[derive(Insertable)]
#[table_name = "quiz_questions"]
pub struct NewQuizQuestion<'a> {
    pub lesson_id: i32,
    pub question_text: &'a str,
    pub options: &'a [String],
    pub correct_answer: &'a str,
    pub points: i32,
    pub order_index: i32,
}

#[derive(Identifiable, Clone, Queryable, Debug, Insertable, Associations, AsChangeset, Serialize)]
#[table_name = "lesson_progress"]
#[primary_key(user_id, lesson_id)]
#[belongs_to(Lesson, foreign_key = "lesson_id")]
pub struct LessonProgress {
    pub user_id: i32,
    pub lesson_id: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub video_progress: i32,
    pub activity_response: Option<String>,
    pub assignment_response: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Identifiable, Clone, Queryable, Debug, Associations, Serialize)]
#[belongs_to(Lesson, foreign_key = "lesson_id")]
pub struct QuizAttempt {
    pub id: i32,
    pub user_id: i32,
    pub lesson_id: i32,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub answers: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "quiz_attempts"]
pub struct NewQuizAttempt<'a> {
    pub user_id: i32,
    pub lesson_id: i32,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub answers: &'a str,
}

#[derive(Identifiable, Clone, Queryable, Debug, Serialize)]
#[table_name = "streak_days"]
#[primary_key(user_id, day)]
pub struct StreakDay {
    pub user_id: i32,
    pub day: NaiveDate,
    pub lessons_completed: i32,
}

#[derive(Insertable)]
#[table_name = "streak_days"]
pub struct NewStreakDay {
    pub user_id: i32,
    pub day: NaiveDate,
}

#[derive(Identifiable, Clone, Queryable, Debug, Serialize)]
pub struct Certificate {
    pub id: i32,
    pub user_id: i32,
    pub cert_number: String,
    pub course_name: String,
    pub module_name: Option<String>,
    pub final_score: i32,
    pub issued: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "certificates"]
pub struct NewCertificate<'a> {
    pub user_id: i32,
    pub cert_number: &'a str,
    pub course_name: &'a str,
    pub module_name: Option<&'a str>,
    pub final_score: i32,
}

#[derive(Identifiable, Clone, Queryable, Debug, Insertable, AsChangeset, Serialize, Deserialize)]
#[table_name = "user_profiles"]
#[primary_key(user_id)]
#[changeset_options(treat_none_as_null = "true")]
pub struct UserProfile {
    pub user_id: i32,
    pub display_name: String,
    pub email: Option<String>,
    pub locale: String,
}

#[derive(Identifiable, Clone, Queryable, Debug, Insertable, Serialize)]
#[table_name = "user_roles"]
#[primary_key(user_id, role)]
pub struct UserRole {
    pub user_id: i32,
    pub role: String,
}

#[derive(Identifiable, Clone, Queryable, Debug, Serialize)]
pub struct DiscoveryAnswer {
    pub id: i32,
    pub user_id: i32,
    pub question_key: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "discovery_answers"]
pub struct NewDiscoveryAnswer<'a> {
    pub user_id: i32,
    pub question_key: &'a str,
    pub answer: &'a str,
}
