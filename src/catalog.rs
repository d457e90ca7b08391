use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::question::{ApplicationType, Question, QuestionKind};

/// Question id of the common Minecraft-username question that leads every
/// form. Its answer is stored on the record itself, not in `answers`.
pub const MINECRAFT_USERNAME_QUESTION_ID: &str = "minecraft_username";

/// Static mapping from application type to its ordered question list.
/// Built once at startup and shared read-only.
pub struct QuestionCatalog {
    types: Vec<ApplicationType>,
    questions: HashMap<String, Vec<Question>>,
}

impl QuestionCatalog {
    pub fn builtin() -> Self {
        let types = vec![
            app_type("staff", "Staff Application", "👨‍⚖️", "Apply to join our staff team"),
            app_type("media", "Media Application", "📹", "Apply to become a content creator"),
            app_type("youtube", "YouTube Partner", "📺", "Partner with us as a YouTuber"),
            app_type("streamer", "Streamer Application", "🎮", "Apply as an official streamer"),
            app_type("moderator", "Moderator Application", "🛡️", "Apply to moderate our community"),
        ];

        let mut questions = HashMap::new();
        questions.insert("staff".to_string(), with_common(vec![
            textarea("experience", 1, "How much experience do you have with server management?"),
            text("timezone", 2, "What is your timezone?"),
            text("hours", 3, "How many hours per week can you dedicate to this role?"),
            textarea("why", 4, "Why do you want to join our staff team?"),
        ]));
        questions.insert("media".to_string(), with_common(vec![
            multiselect(
                "platforms",
                1,
                "Which platforms do you create content on?",
                &["YouTube", "TikTok", "Twitch", "Instagram", "Other"],
            ),
            text("followers", 2, "How many followers/subscribers do you have?"),
            textarea("content_type", 3, "What type of content do you create?"),
            textarea("portfolio", 4, "Please share links to your content"),
        ]));
        questions.insert("youtube".to_string(), with_common(vec![
            text("channel", 1, "Your YouTube channel link"),
            text("subscribers", 2, "How many subscribers do you have?"),
            text("avg_views", 3, "What is your average video view count?"),
            select(
                "upload_frequency",
                4,
                "How often do you upload videos?",
                &["Daily", "3-4 times a week", "Twice a week", "Weekly", "Bi-weekly", "Monthly"],
            ),
        ]));
        questions.insert("streamer".to_string(), with_common(vec![
            select(
                "platform",
                1,
                "Which platform do you stream on?",
                &["Twitch", "YouTube", "Kick", "Other"],
            ),
            text("followers", 2, "How many followers do you have?"),
            text("avg_viewers", 3, "What is your average viewer count?"),
            textarea("stream_schedule", 4, "What is your streaming schedule?"),
        ]));
        questions.insert("moderator".to_string(), with_common(vec![
            textarea("experience", 1, "Do you have moderation experience? If yes, please describe"),
            text("availability", 2, "How many hours per day can you moderate?"),
            text("timezone", 3, "What is your timezone?"),
            textarea("motivation", 4, "Why do you want to help moderate our community?"),
        ]));

        Self { types, questions }
    }

    /// Stable, configured order.
    pub fn list_types(&self) -> &[ApplicationType] {
        &self.types
    }

    /// The full form for a type: common username question first, then the
    /// type-specific questions in ascending order.
    pub fn questions_for(&self, type_id: &str) -> Result<&[Question]> {
        self.questions
            .get(type_id)
            .map(|qs| qs.as_slice())
            .ok_or_else(|| Error::UnknownType(type_id.to_string()))
    }
}

fn app_type(id: &str, label: &str, icon: &str, description: &str) -> ApplicationType {
    ApplicationType {
        id: id.to_string(),
        label: label.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
    }
}

fn with_common(mut specific: Vec<Question>) -> Vec<Question> {
    let mut list = vec![text(
        MINECRAFT_USERNAME_QUESTION_ID,
        0,
        "What is your Minecraft username?",
    )];
    specific.sort_by_key(|q| q.order);
    list.append(&mut specific);
    list
}

fn text(id: &str, order: i32, prompt: &str) -> Question {
    question(id, order, prompt, QuestionKind::Text, None)
}

fn textarea(id: &str, order: i32, prompt: &str) -> Question {
    question(id, order, prompt, QuestionKind::Textarea, None)
}

fn select(id: &str, order: i32, prompt: &str, options: &[&str]) -> Question {
    question(id, order, prompt, QuestionKind::Select, Some(options))
}

fn multiselect(id: &str, order: i32, prompt: &str, options: &[&str]) -> Question {
    question(id, order, prompt, QuestionKind::Multiselect, Some(options))
}

fn question(
    id: &str,
    order: i32,
    prompt: &str,
    kind: QuestionKind,
    options: Option<&[&str]>,
) -> Question {
    Question {
        id: id.to_string(),
        order,
        text: prompt.to_string(),
        kind,
        required: true,
        options: options.map(|opts| opts.iter().map(|o| o.to_string()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_type_starts_with_the_username_question() {
        let catalog = QuestionCatalog::builtin();
        for app_type in catalog.list_types() {
            let questions = catalog.questions_for(&app_type.id).unwrap();
            assert_eq!(questions[0].id, MINECRAFT_USERNAME_QUESTION_ID);
            assert_eq!(questions[0].order, 0);
        }
    }

    #[test]
    fn question_ids_are_unique_and_ordered_per_type() {
        let catalog = QuestionCatalog::builtin();
        for app_type in catalog.list_types() {
            let questions = catalog.questions_for(&app_type.id).unwrap();
            let ids: HashSet<_> = questions.iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids.len(), questions.len(), "duplicate ids in {}", app_type.id);
            for pair in questions.windows(2) {
                assert!(pair[0].order < pair[1].order);
            }
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let catalog = QuestionCatalog::builtin();
        let err = catalog.questions_for("builder").unwrap_err();
        assert!(matches!(err, Error::UnknownType(_)));
    }

    #[test]
    fn select_questions_carry_options() {
        let catalog = QuestionCatalog::builtin();
        let questions = catalog.questions_for("streamer").unwrap();
        let platform = questions.iter().find(|q| q.id == "platform").unwrap();
        assert_eq!(platform.kind, QuestionKind::Select);
        assert!(platform.options.as_ref().unwrap().contains(&"Twitch".to_string()));
    }
}
