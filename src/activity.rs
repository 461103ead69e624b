//! Interactive-activity configs. Lessons may carry one opaque-looking
//! activity payload; it is stored as JSON text but always validated against
//! the tagged union below before anything is persisted.

use super::*;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityConfig {
    /// Free-form journaling prompts shown after the lesson video.
    Reflection { prompts: Vec<String> },
    /// Rate-yourself statements on a 1..=scale_max scale.
    SelfAssessment { statements: Vec<String>, scale_max: u8 },
    /// A fill-in plan the learner commits to.
    ActionPlan { fields: Vec<String> },
    /// Drag-the-items-into-order exercise.
    Ranking { items: Vec<String> },
}

impl ActivityConfig {
    pub fn kind(&self) -> &'static str {
        match *self {
            ActivityConfig::Reflection { .. } => "reflection",
            ActivityConfig::SelfAssessment { .. } => "self_assessment",
            ActivityConfig::ActionPlan { .. } => "action_plan",
            ActivityConfig::Ranking { .. } => "ranking",
        }
    }
}

/// Parses an activity payload, checking that the JSON's tag agrees with the
/// declared kind. A lesson without an activity yields `None`.
pub fn parse_activity(kind: Option<&str>, config: Option<&str>) -> Result<Option<ActivityConfig>> {
    let (kind, config) = match (kind, config) {
        (Some(kind), Some(config)) => (kind, config),
        (None, None) => return Ok(None),
        _ => return Err(ErrorKind::BadActivityConfig("<missing half>".into()).into()),
    };

    let parsed: ActivityConfig = serde_json::from_str(config)
        .chain_err(|| ErrorKind::BadActivityConfig(kind.to_string()))?;

    if parsed.kind() != kind {
        warn!("Activity declares kind {:?} but its config parses as {:?}.",
              kind,
              parsed.kind());
        return Err(ErrorKind::BadActivityConfig(kind.to_string()).into());
    }

    validate(&parsed)?;

    Ok(Some(parsed))
}

pub fn parse_lesson_activity(lesson: &Lesson) -> Result<Option<ActivityConfig>> {
    parse_activity(lesson.activity_kind.as_deref(), lesson.activity_config.as_deref())
}

fn validate(config: &ActivityConfig) -> Result<()> {
    let ok = match *config {
        ActivityConfig::Reflection { ref prompts } => !prompts.is_empty(),
        ActivityConfig::SelfAssessment { ref statements, scale_max } => {
            !statements.is_empty() && scale_max >= 2
        }
        ActivityConfig::ActionPlan { ref fields } => !fields.is_empty(),
        ActivityConfig::Ranking { ref items } => items.len() >= 2,
    };
    if ok {
        Ok(())
    } else {
        Err(ErrorKind::BadActivityConfig(config.kind().to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_with(kind: Option<&str>, config: Option<&str>) -> Lesson {
        Lesson {
            id: 1,
            module_id: 1,
            seq_no: 1,
            title: "t".into(),
            content: "c".into(),
            activity_kind: kind.map(Into::into),
            activity_config: config.map(Into::into),
        }
    }

    #[test]
    fn no_activity_is_fine() {
        assert_eq!(parse_lesson_activity(&lesson_with(None, None)).unwrap(), None);
    }

    #[test]
    fn kind_and_tag_must_agree() {
        let l = lesson_with(Some("ranking"),
                            Some(r#"{"kind":"reflection","prompts":["p"]}"#));
        assert!(parse_lesson_activity(&l).is_err());
    }

    #[test]
    fn valid_reflection_parses() {
        let l = lesson_with(Some("reflection"),
                            Some(r#"{"kind":"reflection","prompts":["What drained you today?"]}"#));
        let parsed = parse_lesson_activity(&l).unwrap().unwrap();
        assert_eq!(parsed, ActivityConfig::Reflection { prompts: vec!["What drained you today?".into()] });
    }

    #[test]
    fn empty_configs_are_rejected() {
        let l = lesson_with(Some("ranking"), Some(r#"{"kind":"ranking","items":["a"]}"#));
        assert!(parse_lesson_activity(&l).is_err());
        let l = lesson_with(Some("self_assessment"),
                            Some(r#"{"kind":"self_assessment","statements":["s"],"scale_max":1}"#));
        assert!(parse_lesson_activity(&l).is_err());
    }

    #[test]
    fn half_missing_payload_is_rejected() {
        assert!(parse_lesson_activity(&lesson_with(Some("reflection"), None)).is_err());
    }
}
