//! Clients for the hosted AI text-completion gateway and the voice-session
//! service. These stay thin: build a prompt from stored rows, forward it,
//! map failure status codes to user-presentable errors. Nothing here ever
//! touches the learner's progress rows.

use super::*;
use serde::{Serialize, Deserialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    content: String,
}

/// The schema the plan-generation prompt instructs the model to emit.
/// Parsing is strict: a response missing any field is rejected whole, and
/// nothing partial is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedPlan {
    pub summary: String,
    pub recommended_lessons: Vec<String>,
    pub diet_plan: String,
    pub training_plan: String,
    pub first_week_actions: Vec<String>,
    pub motivational_message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceSession {
    pub signed_url: String,
    pub token: String,
}

pub struct CoachClient {
    pub gateway_url: String,
    pub voice_url: String,
    pub api_key: String,
}

fn gateway_error(status: u16) -> Error {
    match status {
        429 => ErrorKind::GatewayRateLimited.into(),
        402 => ErrorKind::GatewayQuotaExceeded.into(),
        status => ErrorKind::GatewayUnavailable(status).into(),
    }
}

impl CoachClient {
    pub fn new(gateway_url: &str, voice_url: &str, api_key: &str) -> CoachClient {
        CoachClient {
            gateway_url: gateway_url.to_string(),
            voice_url: voice_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// One coaching-chat completion: system prompt plus history in, a
    /// natural-language reply out.
    pub fn chat(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String> {
        let resp = ureq::post(&self.gateway_url)
            .set("Authorization", &self.bearer())
            .send_json(json!({
                "system": system_prompt,
                "messages": history,
            }));

        if !resp.ok() {
            warn!("AI gateway answered with status {}.", resp.status());
            return Err(gateway_error(resp.status()));
        }

        let reply: ChatResponse = resp.into_json_deserialize()
            .chain_err(|| "Couldn't read the AI gateway's reply!")?;
        Ok(reply.content)
    }

    /// Asks the gateway for a personalized plan and parses it against the
    /// documented schema. Malformed output maps to one error; no partial
    /// plan escapes.
    pub fn personalized_plan(&self, plan_prompt: &str) -> Result<PersonalizedPlan> {
        let reply = self.chat(PLAN_SYSTEM_PROMPT, &[ChatMessage {
            role: "user".to_string(),
            content: plan_prompt.to_string(),
        }])?;

        parse_plan(&reply)
    }

    /// Fetches a short-lived signed URL + token for a real-time voice
    /// coaching session.
    pub fn voice_session(&self, system_prompt: &str, user_context: &str) -> Result<VoiceSession> {
        let resp = ureq::post(&self.voice_url)
            .set("Authorization", &self.bearer())
            .send_json(json!({
                "system": system_prompt,
                "context": user_context,
            }));

        if !resp.ok() {
            warn!("Voice service answered with status {}.", resp.status());
            return Err(gateway_error(resp.status()));
        }

        Ok(resp.into_json_deserialize()
            .chain_err(|| "Couldn't read the voice session grant!")?)
    }
}

pub const PLAN_SYSTEM_PROMPT: &str = "You are the Leader Performance Academy coach. Reply with \
     a single JSON object with exactly these fields: summary (string), recommended_lessons \
     (array of lesson titles), diet_plan (string), training_plan (string), first_week_actions \
     (array of strings), motivational_message (string). No prose outside the JSON.";

pub fn parse_plan(reply: &str) -> Result<PersonalizedPlan> {
    serde_json::from_str(reply).map_err(|e| {
        warn!("The gateway's plan wasn't parseable: {}", e);
        ErrorKind::MalformedPlan.into()
    })
}

/// The coaching system prompt: who the learner is, what they said about
/// themselves in the discovery questionnaire, and where they stand in the
/// curriculum, all re-read from current rows.
pub fn coach_system_prompt(conn: &PgConnection, user_id: i32) -> Result<String> {
    use chrono::offset::Utc;
    use std::fmt::Write;

    let profile = profile::get_profile(conn, user_id)?
        .ok_or_else(|| Error::from(ErrorKind::NoCurrentUser))?;
    let answers = profile::discovery_answers(conn, user_id)?;
    let stats = stats::dashboard_stats(conn, user_id, Utc::now().date().naive_utc())?;

    let mut prompt = format!("You are a performance coach for {} (locale: {}). \
                              Be concrete, warm and brief.\n",
                             profile.display_name,
                             profile.locale);

    if !answers.is_empty() {
        prompt.push_str("What they said about themselves:\n");
        for a in &answers {
            let _ = writeln!(prompt, "- {}: {}", a.question_key, a.answer);
        }
    }

    let _ = writeln!(prompt,
                     "Their progress: {} XP, current streak {} days (longest {}).",
                     stats.total_xp,
                     stats.current_streak,
                     stats.longest_streak);
    for (module_name, pct) in &stats.module_progress {
        let _ = writeln!(prompt, "- {}: {} % complete", module_name, pct);
    }

    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_complete_plan_parses() {
        let plan = parse_plan(r#"{
            "summary": "s",
            "recommended_lessons": ["Energy Basics"],
            "diet_plan": "d",
            "training_plan": "t",
            "first_week_actions": ["sleep earlier"],
            "motivational_message": "m"
        }"#).unwrap();
        assert_eq!(plan.recommended_lessons, vec!["Energy Basics".to_string()]);
    }

    #[test]
    fn a_plan_missing_fields_is_malformed() {
        let err = parse_plan(r#"{"summary": "s"}"#).unwrap_err();
        match *err.kind() {
            ErrorKind::MalformedPlan => (),
            ref other => panic!("expected MalformedPlan, got {:?}", other),
        }
    }

    #[test]
    fn prose_around_the_json_is_malformed() {
        assert!(parse_plan("Sure! Here's your plan: {\"summary\": \"s\"}").is_err());
    }

    #[test]
    fn status_codes_map_to_distinct_errors() {
        match *gateway_error(429).kind() {
            ErrorKind::GatewayRateLimited => (),
            ref other => panic!("{:?}", other),
        }
        match *gateway_error(402).kind() {
            ErrorKind::GatewayQuotaExceeded => (),
            ref other => panic!("{:?}", other),
        }
        match *gateway_error(503).kind() {
            ErrorKind::GatewayUnavailable(503) => (),
            ref other => panic!("{:?}", other),
        }
    }
}
