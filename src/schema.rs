table! {
    modules (id) {
        id -> Int4,
        name -> Varchar,
        position -> Int4,
        passing_score -> Int4,
    }
}

table! {
    lessons (id) {
        id -> Int4,
        module_id -> Int4,
        seq_no -> Int4,
        title -> Varchar,
        content -> Text,
        activity_kind -> Nullable<Varchar>,
        activity_config -> Nullable<Text>,
    }
}

table! {
    quiz_questions (id) {
        id -> Int4,
        lesson_id -> Int4,
        question_text -> Text,
        options -> Array<Text>,
        correct_answer -> Varchar,
        points -> Int4,
        order_index -> Int4,
    }
}

table! {
    lesson_progress (user_id, lesson_id) {
        user_id -> Int4,
        lesson_id -> Int4,
        completed -> Bool,
        completed_at -> Nullable<Timestamptz>,
        video_progress -> Int4,
        activity_response -> Nullable<Text>,
        assignment_response -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}

table! {
    quiz_attempts (id) {
        id -> Int4,
        user_id -> Int4,
        lesson_id -> Int4,
        score -> Int4,
        total -> Int4,
        percentage -> Int4,
        passed -> Bool,
        answers -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    streak_days (user_id, day) {
        user_id -> Int4,
        day -> Date,
        lessons_completed -> Int4,
    }
}

table! {
    certificates (id) {
        id -> Int4,
        user_id -> Int4,
        cert_number -> Varchar,
        course_name -> Varchar,
        module_name -> Nullable<Varchar>,
        final_score -> Int4,
        issued -> Timestamptz,
    }
}

table! {
    user_profiles (user_id) {
        user_id -> Int4,
        display_name -> Varchar,
        email -> Nullable<Varchar>,
        locale -> Varchar,
    }
}

table! {
    user_roles (user_id, role) {
        user_id -> Int4,
        role -> Varchar,
    }
}

table! {
    discovery_answers (id) {
        id -> Int4,
        user_id -> Int4,
        question_key -> Varchar,
        answer -> Text,
        created_at -> Timestamptz,
    }
}

joinable!(lessons -> modules (module_id));
joinable!(quiz_questions -> lessons (lesson_id));
joinable!(lesson_progress -> lessons (lesson_id));
joinable!(quiz_attempts -> lessons (lesson_id));

allow_tables_to_appear_in_same_query!(
    modules,
    lessons,
    quiz_questions,
    lesson_progress,
    quiz_attempts,
    streak_days,
    certificates,
    user_profiles,
    user_roles,
    discovery_answers,
);
