use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, ApplicationStatus};

/// Posts review cards and result notices. Every method is advisory: the
/// application service logs failures and never rolls back state because of
/// them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Posts the review card to the moderation channel and returns its
    /// message handle when the post succeeded.
    async fn post_review_card(&self, record: &ApplicationRecord) -> Result<Option<String>>;

    /// Direct-messages the applicant with the review outcome.
    async fn send_result_notice(
        &self,
        applicant_id: &str,
        outcome: ApplicationStatus,
        application_id: Uuid,
    ) -> Result<bool>;

    /// Disables the accept/reject buttons on an already-posted review card.
    async fn resolve_review_card(&self, message_id: &str) -> Result<bool>;
}

/// Discord REST integration: embeds into the application channel with
/// accept/reject button components, result embeds over DM.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
}

impl DiscordNotifier {
    pub fn new(api_base: String, bot_token: String, channel_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build Discord client: {}", e)))?;
        Ok(Self {
            client,
            api_base,
            bot_token,
            channel_id,
        })
    }

    async fn post_json(&self, url: &str, payload: &JsonValue) -> Result<JsonValue> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Discord request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Notification(format!(
                "Discord returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Notification(format!("Malformed Discord response: {}", e)))
    }
}

#[async_trait]
impl NotificationDispatcher for DiscordNotifier {
    async fn post_review_card(&self, record: &ApplicationRecord) -> Result<Option<String>> {
        let url = format!("{}/channels/{}/messages", self.api_base, self.channel_id);
        let payload = json!({
            "embeds": [review_card_embed(record)],
            "components": [review_buttons(&record.id.to_string(), false)],
        });

        let body = self.post_json(&url, &payload).await?;
        Ok(body["id"].as_str().map(String::from))
    }

    async fn send_result_notice(
        &self,
        applicant_id: &str,
        outcome: ApplicationStatus,
        application_id: Uuid,
    ) -> Result<bool> {
        let dm_url = format!("{}/users/@me/channels", self.api_base);
        let dm_channel = self
            .post_json(&dm_url, &json!({ "recipient_id": applicant_id }))
            .await?;
        let Some(channel_id) = dm_channel["id"].as_str() else {
            return Err(Error::Notification(
                "DM channel response missing id".to_string(),
            ));
        };

        let message_url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let payload = json!({ "embeds": [result_embed(outcome, application_id)] });
        self.post_json(&message_url, &payload).await?;
        Ok(true)
    }

    async fn resolve_review_card(&self, message_id: &str) -> Result<bool> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.api_base, self.channel_id, message_id
        );
        let payload = json!({ "components": [review_buttons("disabled", true)] });

        let response = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Discord request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Notification(format!(
                "Discord returned {}",
                response.status()
            )));
        }
        Ok(true)
    }
}

fn review_card_embed(record: &ApplicationRecord) -> JsonValue {
    // Question ids as field names, sorted so the card layout is stable.
    let mut entries: Vec<_> = record.answers.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let fields: Vec<JsonValue> = entries
        .into_iter()
        .map(|(question, answer)| {
            json!({ "name": question, "value": answer, "inline": false })
        })
        .collect();

    json!({
        "color": 0xFF6B00,
        "author": {
            "name": format!("{}#{}", record.applicant_display_name, record.applicant_id),
            "icon_url": record.avatar_url,
        },
        "title": format!("New {} application", record.application_type),
        "description": format!("**Minecraft Username:** {}", record.minecraft_username),
        "fields": fields,
        "footer": {
            "text": format!("Application ID: {} • Submitted at", record.id),
            "icon_url": record.avatar_url,
        },
        "timestamp": record.submitted_at.to_rfc3339(),
    })
}

fn review_buttons(application_id: &str, disabled: bool) -> JsonValue {
    json!({
        "type": 1,
        "components": [
            {
                "type": 2,
                "label": "✅ Accept Applicant",
                "style": 3,
                "custom_id": format!("accept_app_{}", application_id),
                "disabled": disabled,
            },
            {
                "type": 2,
                "label": "❌ Reject Applicant",
                "style": 4,
                "custom_id": format!("reject_app_{}", application_id),
                "disabled": disabled,
            }
        ],
    })
}

fn result_embed(outcome: ApplicationStatus, application_id: Uuid) -> JsonValue {
    let footer = json!({ "text": format!("Application ID: {}", application_id) });
    match outcome {
        ApplicationStatus::Accepted => json!({
            "color": 0x00FF00,
            "title": "✅ Application Accepted!",
            "description": "Congratulations! Your application has been accepted. Welcome to the team!",
            "fields": [{
                "name": "Next Steps",
                "value": "Check the server for your new role and permissions. If you have any questions, feel free to reach out to our moderators.",
                "inline": false,
            }],
            "footer": footer,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        _ => json!({
            "color": 0xFF0000,
            "title": "❌ Application Rejected",
            "description": "Unfortunately, your application was not accepted at this time.",
            "fields": [{
                "name": "Feedback",
                "value": "Feel free to apply again in the future or contact our moderators for feedback.",
                "inline": false,
            }],
            "footer": footer,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
    }
}
