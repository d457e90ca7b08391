use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationFormResponse, ApplicationResponse, FormQuery, ReviewApplicationPayload,
        ReviewApplicationResponse, SubmitApplicationPayload, SubmitApplicationResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    services::application_service::SubmitApplication,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/applications/types",
    responses(
        (status = 200, description = "List of application types")
    )
)]
#[axum::debug_handler]
pub async fn list_types(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.catalog.list_types().to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/applications/form",
    params(
        ("type" = String, Query, description = "Application type id")
    ),
    responses(
        (status = 200, description = "Form for the requested type", body = Json<ApplicationFormResponse>),
        (status = 404, description = "Application type not found")
    )
)]
#[axum::debug_handler]
pub async fn get_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<impl IntoResponse> {
    let questions = state.catalog.questions_for(&query.application_type)?;
    let app_type = state
        .catalog
        .list_types()
        .iter()
        .find(|t| t.id == query.application_type)
        .ok_or_else(|| Error::UnknownType(query.application_type.clone()))?;

    Ok(Json(ApplicationFormResponse {
        type_id: app_type.id.clone(),
        label: app_type.label.clone(),
        description: app_type.description.clone(),
        icon: app_type.icon.clone(),
        questions: questions.to_vec(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<SubmitApplicationResponse>),
        (status = 400, description = "Invalid answers or identity"),
        (status = 404, description = "Application type not found"),
        (status = 503, description = "Identity service unavailable, retry later")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let record = state
        .application_service
        .submit(SubmitApplication {
            application_type: payload.application_type,
            applicant_id: payload.applicant_id,
            applicant_display_name: payload.applicant_display_name,
            avatar_url: payload.avatar_url,
            minecraft_username: payload.minecraft_username,
            answers: payload.answers,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            application_id: record.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = Json<ApplicationResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state.application_service.get(id).await?;
    Ok(Json(ApplicationResponse::from(record)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = ReviewApplicationPayload,
    responses(
        (status = 200, description = "Application reviewed", body = Json<ReviewApplicationResponse>),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already reviewed")
    )
)]
#[axum::debug_handler]
pub async fn review_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewApplicationPayload>,
) -> Result<impl IntoResponse> {
    let reviewer_id = payload.reviewer_id.unwrap_or(claims.sub);
    let record = state
        .application_service
        .review(id, payload.action, &reviewer_id)
        .await?;

    Ok(Json(ReviewApplicationResponse {
        status: record.status,
    }))
}
