error_chain! {
    foreign_links {
        ParseIntError(::std::num::ParseIntError);
        VarError(::std::env::VarError);
        StdIoError(::std::io::Error);
        JsonError(::serde_json::Error);
        DieselError(::diesel::result::Error);
        DieselMigrationError(::diesel_migrations::RunMigrationsError);
    }
    errors {
        InvalidInput {
            description("Provided input is invalid.")
            display("Provided input is invalid.")
        }
        NoSuchModule(name: String) {
            description("No such module exists")
            display("No module called {} exists.", name)
        }
        NoSuchLesson(id: i32) {
            description("No such lesson exists")
            display("No lesson with id {} exists.", id)
        }
        NoCurrentUser {
            description("No signed-in user")
            display("No signed-in user; sign in first.")
        }
        AccessDenied {
            description("Access denied")
            display("Access denied")
        }
        EmptyQuiz(lesson_id: i32) {
            description("The lesson has no quiz questions")
            display("Lesson {} has no quiz questions; nothing to grade.", lesson_id)
        }
        AnswerMissing(index: usize) {
            description("A question hasn't been answered yet")
            display("Question {} hasn't been answered yet.", index + 1)
        }
        NoSuchQuestion(index: usize) {
            description("No question at that index")
            display("No question at index {}.", index)
        }
        BadActivityConfig(kind: String) {
            description("Interactive activity config doesn't match its kind")
            display("Interactive activity config doesn't match its declared kind {:?}.", kind)
        }
        GatewayRateLimited {
            description("The AI gateway is rate limiting us")
            display("The AI gateway is rate limiting us. Try again in a moment.")
        }
        GatewayQuotaExceeded {
            description("The AI gateway reports the quota/payment limit is hit")
            display("The AI gateway reports the quota/payment limit is hit.")
        }
        GatewayUnavailable(status: u16) {
            description("The AI gateway call failed")
            display("The AI gateway call failed with status {}.", status)
        }
        MalformedPlan {
            description("The AI gateway returned an unparseable personalized plan")
            display("The AI gateway returned an unparseable personalized plan.")
        }
        DatabaseOdd(reason: &'static str) {
            description("There's something wrong with the contents of the DB vs. how it should be!")
            display("There's something wrong with the contents of the DB vs. how it should be! {}", reason)
        }
    }
}
