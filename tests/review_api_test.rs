use std::env;
use std::sync::Arc;

use applications_backend::error::Result;
use applications_backend::middleware::auth::Claims;
use applications_backend::models::application::{ApplicationRecord, ApplicationStatus};
use applications_backend::services::identity_service::{IdentityVerifier, Verification};
use applications_backend::services::notify_service::NotificationDispatcher;
use applications_backend::store::MemoryStore;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use std::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

struct AlwaysValidVerifier;

#[async_trait]
impl IdentityVerifier for AlwaysValidVerifier {
    async fn verify(&self, username: &str) -> Result<Verification> {
        Ok(Verification {
            valid: true,
            uuid: Some(format!("uuid-{}", username.to_lowercase())),
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<(String, ApplicationStatus)>>,
    resolved: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn post_review_card(&self, record: &ApplicationRecord) -> Result<Option<String>> {
        Ok(Some(format!("msg-{}", record.id)))
    }

    async fn send_result_notice(
        &self,
        applicant_id: &str,
        outcome: ApplicationStatus,
        _application_id: Uuid,
    ) -> Result<bool> {
        self.notices
            .lock()
            .unwrap()
            .push((applicant_id.to_string(), outcome));
        Ok(true)
    }

    async fn resolve_review_card(&self, message_id: &str) -> Result<bool> {
        self.resolved.lock().unwrap().push(message_id.to_string());
        Ok(true)
    }
}

fn setup() -> (Router, applications_backend::AppState, Arc<RecordingNotifier>) {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("DISCORD_BOT_TOKEN", "bot-token");
    env::set_var("DISCORD_APPLICATION_CHANNEL_ID", "123456");
    env::set_var("RATE_LIMIT_MAX_REQUESTS", "1000");
    let _ = applications_backend::config::init_config();

    let notifier = Arc::new(RecordingNotifier::default());
    let state = applications_backend::AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(AlwaysValidVerifier),
        notifier.clone(),
    );

    let app = Router::new()
        .route(
            "/api/applications/:id/review",
            post(applications_backend::routes::application_routes::review_application),
        )
        .layer(axum::middleware::from_fn(
            applications_backend::middleware::auth::require_moderator,
        ))
        .with_state(state.clone());

    (app, state, notifier)
}

fn bearer_token(sub: &str, role: Option<&str>) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: role.map(String::from),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test_secret_key"),
    )
    .expect("encode token")
}

async fn submit_staff_application(state: &applications_backend::AppState) -> Uuid {
    let record = state
        .application_service
        .submit(
            applications_backend::services::application_service::SubmitApplication {
                application_type: "staff".to_string(),
                applicant_id: "4242".to_string(),
                applicant_display_name: "notch".to_string(),
                avatar_url: String::new(),
                minecraft_username: "Notch".to_string(),
                answers: [
                    ("experience", "5 years"),
                    ("timezone", "UTC"),
                    ("hours", "10"),
                    ("why", "love the community"),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            },
        )
        .await
        .expect("submit application");
    record.id
}

async fn review_request(
    app: &Router,
    id: Uuid,
    token: &str,
    action: &str,
) -> axum::response::Response {
    let body = json!({ "action": action, "reviewerId": "mod-7" });
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/applications/{}/review", id))
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn accept_transitions_the_record_and_notifies_the_applicant() {
    let (app, state, notifier) = setup();
    let id = submit_staff_application(&state).await;
    let token = bearer_token("mod-7", Some("moderator"));

    let resp = review_request(&app, id, &token, "accept").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "accepted");

    let record = state.application_service.get(id).await.unwrap();
    assert_eq!(record.status, ApplicationStatus::Accepted);
    assert_eq!(record.reviewed_by.as_deref(), Some("mod-7"));
    assert!(record.reviewed_at.is_some());

    assert_eq!(
        notifier.notices.lock().unwrap().as_slice(),
        &[("4242".to_string(), ApplicationStatus::Accepted)]
    );
    assert_eq!(
        notifier.resolved.lock().unwrap().as_slice(),
        &[format!("msg-{}", id)]
    );
}

#[tokio::test]
async fn second_review_conflicts_and_keeps_the_first_outcome() {
    let (app, state, _notifier) = setup();
    let id = submit_staff_application(&state).await;
    let token = bearer_token("mod-7", Some("moderator"));

    let resp = review_request(&app, id, &token, "accept").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = review_request(&app, id, &token, "reject").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let record = state.application_service.get(id).await.unwrap();
    assert_eq!(record.status, ApplicationStatus::Accepted);
}

#[tokio::test]
async fn review_requires_the_moderator_capability() {
    let (app, state, _notifier) = setup();
    let id = submit_staff_application(&state).await;

    let member = bearer_token("4242", None);
    let resp = review_request(&app, id, &member, "accept").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/applications/{}/review", id))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "action": "accept" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let record = state.application_service.get(id).await.unwrap();
    assert_eq!(record.status, ApplicationStatus::Submitted);
}

#[tokio::test]
async fn reviewing_an_unknown_application_is_not_found() {
    let (app, _state, _notifier) = setup();
    let token = bearer_token("mod-7", Some("moderator"));

    let resp = review_request(&app, Uuid::new_v4(), &token, "accept").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
