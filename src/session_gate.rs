//! Staff session gate.
//!
//! The staff login for the QR publishing tool. The principal is kept in
//! memory and mirrored to a [`PrincipalStore`] under [`PRINCIPAL_KEY`], so
//! whoever holds that record comes back logged in. Over HTTP the record is
//! an entry in the visitor's own `tower-sessions` session, so a login
//! belongs to the browser that made it. Embedders without sessions can
//! back the gate with the [`LocalStore`] instead.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::Result;
use crate::storage::LocalStore;

/// Durable key holding the logged-in principal.
pub const PRINCIPAL_KEY: &str = "anandwanUser";

/// Where a gate keeps its principal between requests and restarts.
#[async_trait]
pub trait PrincipalStore: fmt::Debug + Send + Sync {
    async fn load_principal(&self) -> Result<Option<String>>;

    async fn save_principal(&self, principal: &str) -> Result<()>;

    /// Clearing an absent record is not an error.
    async fn clear_principal(&self) -> Result<()>;
}

#[async_trait]
impl PrincipalStore for LocalStore {
    async fn load_principal(&self) -> Result<Option<String>> {
        self.get(PRINCIPAL_KEY).await
    }

    async fn save_principal(&self, principal: &str) -> Result<()> {
        self.set(PRINCIPAL_KEY, &principal).await
    }

    async fn clear_principal(&self) -> Result<()> {
        self.remove(PRINCIPAL_KEY).await
    }
}

#[async_trait]
impl PrincipalStore for Session {
    async fn load_principal(&self) -> Result<Option<String>> {
        Ok(self.get(PRINCIPAL_KEY).await?)
    }

    async fn save_principal(&self, principal: &str) -> Result<()> {
        Ok(self.insert(PRINCIPAL_KEY, principal).await?)
    }

    async fn clear_principal(&self) -> Result<()> {
        self.remove::<String>(PRINCIPAL_KEY).await?;
        Ok(())
    }
}

/// Snapshot of the gate. `authenticated` is derived from `principal`, so
/// the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    principal: Option<String>,
}

impl SessionState {
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Handle to one staff session.
///
/// Clones share one underlying state, so a login or logout through any
/// clone is visible through all of them immediately. Gates restored from
/// different stores are independent.
#[derive(Debug, Clone)]
pub struct SessionGate {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn PrincipalStore>,
    credentials: Arc<Credentials>,
}

impl SessionGate {
    /// Rehydrates the gate from `store`.
    ///
    /// A stored principal is trusted as-is; the credential is not checked
    /// again.
    pub async fn restore<P>(store: P, credentials: impl Into<Arc<Credentials>>) -> Result<Self>
    where
        P: PrincipalStore + 'static,
    {
        let principal = store.load_principal().await?;
        if let Some(principal) = &principal {
            debug!(principal = %principal, "restored staff session");
        }

        Ok(Self {
            state: Arc::new(RwLock::new(SessionState { principal })),
            store: Arc::new(store),
            credentials: credentials.into(),
        })
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn principal(&self) -> Option<String> {
        self.snapshot().principal
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// Checks the credential pair and opens the session on a match.
    ///
    /// Returns `Ok(false)` on a mismatch with state untouched. The principal
    /// is written to the store before memory changes, so a storage failure
    /// leaves the gate closed.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        if !self.credentials.matches(username, password) {
            warn!(username, "staff login rejected");
            return Ok(false);
        }

        self.store.save_principal(username).await?;
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .principal = Some(username.to_string());

        info!(principal = username, "staff logged in");
        Ok(true)
    }

    /// Closes the session and erases the stored record. Idempotent.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear_principal().await?;

        let previous = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .principal
            .take();

        if let Some(principal) = previous {
            info!(principal = %principal, "staff logged out");
        }
        Ok(())
    }
}
