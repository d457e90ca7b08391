use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{QuestionCatalog, MINECRAFT_USERNAME_QUESTION_ID};
use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, ApplicationStatus, ReviewAction};
use crate::services::identity_service::IdentityVerifier;
use crate::services::notify_service::NotificationDispatcher;
use crate::store::ApplicationStore;
use crate::utils::validation::validate_answers;

#[derive(Debug, Clone)]
pub struct SubmitApplication {
    pub application_type: String,
    pub applicant_id: String,
    pub applicant_display_name: String,
    pub avatar_url: String,
    pub minecraft_username: String,
    pub answers: HashMap<String, String>,
}

/// Orchestrates the application lifecycle: validate, verify, persist,
/// notify, and later transition on review. The service is the only writer
/// to the store.
#[derive(Clone)]
pub struct ApplicationService {
    catalog: Arc<QuestionCatalog>,
    store: Arc<dyn ApplicationStore>,
    verifier: Arc<dyn IdentityVerifier>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl ApplicationService {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        store: Arc<dyn ApplicationStore>,
        verifier: Arc<dyn IdentityVerifier>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            catalog,
            store,
            verifier,
            notifier,
        }
    }

    /// Cheapest checks run first: type and answers are rejected before any
    /// network call, and the identity check runs before a record exists so
    /// a transient failure leaves nothing behind and the caller may retry.
    pub async fn submit(&self, submission: SubmitApplication) -> Result<ApplicationRecord> {
        let questions = self.catalog.questions_for(&submission.application_type)?;

        let mut combined = submission.answers.clone();
        combined.insert(
            MINECRAFT_USERNAME_QUESTION_ID.to_string(),
            submission.minecraft_username.clone(),
        );
        let report = validate_answers(&combined, questions);
        if !report.valid {
            return Err(Error::InvalidAnswers {
                field_errors: report.field_errors,
            });
        }

        let verification = self.verifier.verify(&submission.minecraft_username).await?;
        let Some(minecraft_uuid) = verification.uuid.filter(|_| verification.valid) else {
            return Err(Error::InvalidIdentity(submission.minecraft_username));
        };

        // Only answers to the type's own questions are persisted; anything
        // else the client sent is dropped before it can reach the record or
        // the review card. The username answer lives on the record itself.
        let mut answers = submission.answers;
        answers.retain(|key, _| {
            key != MINECRAFT_USERNAME_QUESTION_ID && questions.iter().any(|q| q.id == *key)
        });

        let record = ApplicationRecord {
            id: Uuid::new_v4(),
            application_type: submission.application_type,
            applicant_id: submission.applicant_id,
            applicant_display_name: submission.applicant_display_name,
            avatar_url: submission.avatar_url,
            minecraft_username: submission.minecraft_username,
            minecraft_uuid,
            answers,
            status: ApplicationStatus::Submitted,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            notification_message_id: None,
        };

        let mut record = self.store.create(record).await?;
        info!(application_id = %record.id, application_type = %record.application_type, "application submitted");

        // Advisory only: a failed review-card post leaves the record valid
        // and reviewable, with no message handle.
        match self.notifier.post_review_card(&record).await {
            Ok(Some(message_id)) => {
                let persisted = self
                    .store
                    .update(record.id, &|rec| {
                        rec.notification_message_id = Some(message_id.clone());
                        Ok(())
                    })
                    .await;
                match persisted {
                    Ok(updated) => record = updated,
                    Err(e) => {
                        warn!(application_id = %record.id, error = %e, "failed to persist review card handle");
                        record.notification_message_id = Some(message_id);
                    }
                }
            }
            Ok(None) => {
                warn!(application_id = %record.id, "review card posted without a message id");
            }
            Err(e) => {
                warn!(application_id = %record.id, error = %e, "failed to post review card");
            }
        }

        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> Result<ApplicationRecord> {
        self.store.get(id).await
    }

    /// Transitions `submitted` to a terminal status exactly once. The guard
    /// runs inside the store's atomic update, so two concurrent reviews of
    /// one record cannot both win.
    pub async fn review(
        &self,
        id: Uuid,
        action: ReviewAction,
        reviewer_id: &str,
    ) -> Result<ApplicationRecord> {
        let target = action.target_status();
        let reviewer = reviewer_id.to_string();

        let updated = self
            .store
            .update(id, &|record| {
                if record.status != ApplicationStatus::Submitted {
                    return Err(Error::InvalidTransition(format!(
                        "Application {} has already been {}",
                        id, record.status
                    )));
                }
                record.status = target;
                record.reviewed_at = Some(Utc::now());
                record.reviewed_by = Some(reviewer.clone());
                Ok(())
            })
            .await?;

        info!(application_id = %id, status = %updated.status, reviewer = reviewer_id, "application reviewed");

        // The stored transition is the authoritative outcome; both notices
        // below are advisory.
        match self
            .notifier
            .send_result_notice(&updated.applicant_id, updated.status, id)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(application_id = %id, "result notice was not delivered"),
            Err(e) => warn!(application_id = %id, error = %e, "failed to send result notice"),
        }

        if let Some(message_id) = updated.notification_message_id.as_deref() {
            if let Err(e) = self.notifier.resolve_review_card(message_id).await {
                warn!(application_id = %id, error = %e, "failed to resolve review card");
            }
        }

        Ok(updated)
    }
}
