//! # Anandwan outreach core
//!
//! The stateful part of the Anandwan outreach site: the public intake forms
//! (volunteer sign-up, donation requests, contact messages), the staff
//! session gate, and the QR publishing tool staff use to put information on
//! campus signage.
//!
//! ## Components
//!
//! - [`LocalStore`]: durable key-value store on Sea-ORM.
//! - [`SubmissionStore`]: append-only submission log, one partition per form.
//! - [`IntakeController`]: validate-then-append state machine, generic over
//!   an [`intake::IntakeSchema`].
//! - [`SessionGate`]: a staff login, restored from whichever
//!   [`PrincipalStore`] holds it (the visitor's session over HTTP).
//! - [`PublishingPipeline`]: title and body to QR code to PNG.
//! - [`server`]: the axum HTTP surface, with visitor sessions kept in the
//!   [`LocalStore`] by [`VisitorSessionStore`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use anandwan_outreach::intake::{PublishDraft, ValidationContext, VolunteerSchema};
//! use anandwan_outreach::{Credentials, IntakeController, LocalStore, PublishingPipeline, SessionGate, SubmissionStore};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://anandwan.db?mode=rwc").await?;
//! let local = LocalStore::new(conn);
//!
//! // Public form
//! let mut volunteer = IntakeController::<VolunteerSchema>::new(SubmissionStore::new(local.clone()));
//! let ctx = ValidationContext::now();
//! volunteer.edit(&ctx, |draft| draft.name = "Asha".into());
//!
//! // Staff QR tool
//! let gate = SessionGate::restore(local, Credentials::default()).await?;
//! gate.login("anandwan", "admin123").await?;
//! let mut pipeline = PublishingPipeline::new(gate, 2 * 1024 * 1024);
//! pipeline.generate(&PublishDraft::new("Clinic Hours", "Open 9am to 5pm every day except Sunday, at the main hospital block."))?;
//! let png = pipeline.export()?;
//! std::fs::write(&png.file_name, &png.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod intake;
#[cfg(feature = "migration")]
pub mod migration;
pub mod publish;
pub mod server;
mod session_gate;
mod storage;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use intake::{FieldErrors, IntakeController, IntakeState};
pub use publish::{ExportedFile, PublishPayload, PublishedArtifact, PublishingPipeline};
pub use session_gate::{PrincipalStore, SessionGate, SessionState, PRINCIPAL_KEY};
pub use storage::{LocalStore, Partition, VisitorSessionStore, SubmissionRecord, SubmissionStore};
