//! HTTP surface for the outreach site.
//!
//! Everything that belongs to one browser lives in that visitor's
//! `tower-sessions` session: their staff login (a [`SessionGate`] restored
//! from the session on each request), which forms sit in their submitted
//! state, and their current QR artifact. Only the submission log is shared.

mod error;
mod extract;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::{Config, Credentials};
use crate::intake::{ContactSchema, DonationSchema, VolunteerSchema};
use crate::publish::PublishingPipeline;
use crate::session_gate::SessionGate;
use crate::storage::SubmissionStore;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub submissions: SubmissionStore,
    pub credentials: Arc<Credentials>,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(submissions: SubmissionStore, config: &Config) -> Self {
        Self {
            submissions,
            credentials: Arc::new(config.credentials.clone()),
            max_image_bytes: config.max_image_bytes,
        }
    }

    pub(crate) fn pipeline(&self, gate: SessionGate) -> PublishingPipeline {
        PublishingPipeline::new(gate, self.max_image_bytes)
    }
}

/// Routes without the session layer.
pub fn routes(state: AppState) -> Router {
    // Base64 inflates by 4/3; leave room for the JSON around it
    let qr_body_limit = state.max_image_bytes / 3 * 4 + 64 * 1024;

    Router::new()
        .route("/api/volunteers", post(handlers::submit_form::<VolunteerSchema>))
        .route("/api/volunteers/validate", post(handlers::validate_form::<VolunteerSchema>))
        .route("/api/volunteers/reset", post(handlers::reset_form::<VolunteerSchema>))
        .route("/api/donations", post(handlers::submit_form::<DonationSchema>))
        .route("/api/donations/validate", post(handlers::validate_form::<DonationSchema>))
        .route("/api/donations/reset", post(handlers::reset_form::<DonationSchema>))
        .route("/api/contacts", post(handlers::submit_form::<ContactSchema>))
        .route("/api/contacts/validate", post(handlers::validate_form::<ContactSchema>))
        .route("/api/contacts/reset", post(handlers::reset_form::<ContactSchema>))
        .route("/api/staff/login", post(handlers::login))
        .route("/api/staff/logout", post(handlers::logout))
        .route("/api/staff/session", get(handlers::session_status))
        .route(
            "/api/qr",
            post(handlers::generate_qr)
                .get(handlers::current_qr)
                .layer(DefaultBodyLimit::max(qr_body_limit)),
        )
        .route("/api/qr/download", get(handlers::download_qr))
        .with_state(state)
}

/// The full application: routes plus visitor sessions kept in `store`.
pub fn app<S>(state: AppState, store: S, config: &Config) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(config.session_inactivity()));

    routes(state).layer(session_layer)
}
