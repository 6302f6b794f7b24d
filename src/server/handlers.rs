use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::extract::{Staff, Visitor};
use super::{ApiError, AppState};
use crate::error::Error;
use crate::intake::{FieldErrors, IntakeController, IntakeState, PersistedSchema, PublishDraft, ValidationContext};
use crate::publish::{export_file_name, ExportedFile, PublishPayload, PublishedArtifact, PublishingPipeline};
use crate::session_gate::SessionState;
use crate::storage::{Partition, SubmissionRecord};

const ARTIFACT_KEY: &str = "publish.artifact";

fn intake_key(partition: Partition) -> String {
    format!("intake.{partition}")
}

async fn saved_state(session: &Session, partition: Partition) -> Result<IntakeState, ApiError> {
    Ok(session
        .get::<IntakeState>(&intake_key(partition))
        .await?
        .unwrap_or_default())
}

pub(super) async fn submit_form<S>(
    State(state): State<AppState>,
    session: Session,
    Json(draft): Json<S::Draft>,
) -> Result<(StatusCode, Json<SubmissionRecord>), ApiError>
where
    S: PersistedSchema,
    S::Draft: DeserializeOwned + Send + 'static,
    S::Valid: Send,
{
    let saved = saved_state(&session, S::PARTITION).await?;
    let mut controller = IntakeController::<S>::resume(state.submissions.clone(), saved);

    let ctx = ValidationContext::now();
    controller.edit(&ctx, move |current| *current = draft);
    let record = controller.submit(&ctx).await?;

    session
        .insert(&intake_key(S::PARTITION), controller.state())
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(super) async fn validate_form<S>(Json(draft): Json<S::Draft>) -> Json<FieldErrors>
where
    S: PersistedSchema,
    S::Draft: DeserializeOwned + Send + 'static,
{
    Json(S::validate(&draft, &ValidationContext::now()).err().unwrap_or_default())
}

pub(super) async fn reset_form<S>(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, ApiError>
where
    S: PersistedSchema,
{
    let saved = saved_state(&session, S::PARTITION).await?;
    let mut controller = IntakeController::<S>::resume(state.submissions.clone(), saved);
    controller.submit_another();

    session
        .insert(&intake_key(S::PARTITION), controller.state())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionView {
    authenticated: bool,
    principal: Option<String>,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        Self {
            authenticated: state.is_authenticated(),
            principal: state.principal().map(str::to_string),
        }
    }
}

pub(super) async fn login(
    visitor: Visitor,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>, ApiError> {
    if !visitor.gate.login(&request.username, &request.password).await? {
        return Err(Error::Authentication.into());
    }
    Ok(Json(visitor.gate.snapshot().into()))
}

/// Closes this visitor's staff session. Other visitors are unaffected.
pub(super) async fn logout(visitor: Visitor) -> Result<StatusCode, ApiError> {
    visitor.gate.logout().await?;
    visitor.session.remove::<PublishPayload>(ARTIFACT_KEY).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn session_status(visitor: Visitor) -> Json<SessionView> {
    Json(visitor.gate.snapshot().into())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    /// Raw base64 or a `data:` URL.
    image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ArtifactView {
    title: String,
    payload: String,
    file_name: String,
    modules: usize,
}

impl From<&PublishedArtifact> for ArtifactView {
    fn from(artifact: &PublishedArtifact) -> Self {
        Self {
            title: artifact.title().to_string(),
            payload: artifact.text().to_string(),
            file_name: export_file_name(artifact.title()),
            modules: artifact.width(),
        }
    }
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, Error> {
    let data = match encoded.strip_prefix("data:") {
        Some(url) => url.split_once(',').map(|(_, data)| data).unwrap_or_default(),
        None => encoded,
    };
    BASE64_STANDARD
        .decode(data.trim())
        .map_err(|e| Error::UnsupportedImage(e.to_string()))
}

async fn resumed_pipeline(state: &AppState, visitor: &Visitor) -> Result<PublishingPipeline, ApiError> {
    let mut pipeline = state.pipeline(visitor.gate.clone());
    if let Some(payload) = visitor.session.get::<PublishPayload>(ARTIFACT_KEY).await? {
        pipeline.resume(&payload)?;
    }
    Ok(pipeline)
}

pub(super) async fn generate_qr(
    State(state): State<AppState>,
    Staff(visitor): Staff,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ArtifactView>, ApiError> {
    let mut pipeline = resumed_pipeline(&state, &visitor).await?;

    if let Some(encoded) = request.image.as_deref() {
        pipeline.attach_image(decode_image(encoded)?)?;
    }

    let draft = PublishDraft::new(request.title, request.content);
    let (view, payload) = {
        let artifact = pipeline.generate(&draft)?;
        (ArtifactView::from(artifact), artifact.payload().clone())
    };

    visitor.session.insert(ARTIFACT_KEY, payload).await?;
    Ok(Json(view))
}

pub(super) async fn current_qr(
    State(state): State<AppState>,
    Staff(visitor): Staff,
) -> Result<Json<ArtifactView>, ApiError> {
    let pipeline = resumed_pipeline(&state, &visitor).await?;
    let artifact = pipeline
        .artifact()
        .ok_or(ApiError::NotFound("No QR code generated yet"))?;
    Ok(Json(artifact.into()))
}

pub(super) async fn download_qr(
    State(state): State<AppState>,
    Staff(visitor): Staff,
) -> Result<impl IntoResponse, ApiError> {
    let pipeline = resumed_pipeline(&state, &visitor).await?;
    let file = pipeline.export()?;

    let headers = [
        (header::CONTENT_TYPE, ExportedFile::CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((headers, file.bytes))
}
