use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use super::{ApiError, AppState};
use crate::error::Error;
use crate::session_gate::SessionGate;

/// The requesting visitor's session and the staff gate stored in it.
pub(super) struct Visitor {
    pub gate: SessionGate,
    pub session: Session,
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| Error::Session(message.to_string()))?;
        let gate = SessionGate::restore(session.clone(), state.credentials.clone()).await?;

        Ok(Visitor { gate, session })
    }
}

/// A [`Visitor`] whose gate is open. Rejects with 401 otherwise.
pub(super) struct Staff(pub Visitor);

impl FromRequestParts<AppState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state).await?;
        if !visitor.gate.is_authenticated() {
            return Err(Error::Unauthenticated.into());
        }
        Ok(Staff(visitor))
    }
}
