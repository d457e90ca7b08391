use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicationRecord, ApplicationStatus, ReviewAction};
use crate::models::question::Question;

/// Wire names follow the site's existing JSON contract (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationPayload {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Application type is required"))]
    pub application_type: String,
    #[validate(length(min = 1, message = "Applicant id is required"))]
    pub applicant_id: String,
    #[validate(length(min = 1, max = 100, message = "Display name is required"))]
    pub applicant_display_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[validate(length(min = 1, max = 16, message = "Minecraft username is required"))]
    pub minecraft_username: String,
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationResponse {
    pub application_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApplicationPayload {
    pub action: ReviewAction,
    /// Defaults to the bearer subject when omitted.
    pub reviewer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewApplicationResponse {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormQuery {
    #[serde(rename = "type")]
    pub application_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationFormResponse {
    #[serde(rename = "type")]
    pub type_id: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub application_type: String,
    pub applicant_id: String,
    pub applicant_display_name: String,
    pub avatar_url: String,
    pub minecraft_username: String,
    pub minecraft_uuid: String,
    pub answers: HashMap<String, String>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub notification_message_id: Option<String>,
}

impl From<ApplicationRecord> for ApplicationResponse {
    fn from(record: ApplicationRecord) -> Self {
        Self {
            id: record.id,
            application_type: record.application_type,
            applicant_id: record.applicant_id,
            applicant_display_name: record.applicant_display_name,
            avatar_url: record.avatar_url,
            minecraft_username: record.minecraft_username,
            minecraft_uuid: record.minecraft_uuid,
            answers: record.answers,
            status: record.status,
            submitted_at: record.submitted_at,
            reviewed_at: record.reviewed_at,
            reviewed_by: record.reviewed_by,
            notification_message_id: record.notification_message_id,
        }
    }
}
