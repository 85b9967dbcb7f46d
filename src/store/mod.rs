//! Persistence collaborator seam.
//!
//! The hosted entity storage behind the CRM is external to this worker; the
//! pipeline only ever talks to it through the [`Datastore`] trait. Two
//! implementations ship with the worker: an in-memory store used by tests
//! (with scripted failure injection) and a JSON-file store backing the
//! standalone CLI.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{
    Contact, Dossier, DossierUpdate, Entreprise, NewContact, NewDossier, NewEntreprise,
    NewTransaction, Transaction,
};

/// Typed storage failure. The gateway's retry policy keys on `RateLimited`
/// and never inspects backend text.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("limite de débit atteinte")]
    RateLimited,
    #[error("enregistrement introuvable: {0}")]
    NotFound(String),
    #[error("erreur du backend: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The slice of the hosted storage contract this pipeline consumes:
/// `list` and `bulk_create` per entity family, plus partial updates of
/// dossiers (direct-debit amount corrections). `bulk_create` is atomic per
/// call — either every record of the batch is persisted or the call fails.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>>;
    async fn bulk_create_entreprises(&self, batch: Vec<NewEntreprise>)
        -> StoreResult<Vec<Entreprise>>;

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>>;
    async fn bulk_create_contacts(&self, batch: Vec<NewContact>) -> StoreResult<Vec<Contact>>;

    async fn list_dossiers(&self) -> StoreResult<Vec<Dossier>>;
    async fn bulk_create_dossiers(&self, batch: Vec<NewDossier>) -> StoreResult<Vec<Dossier>>;
    async fn update_dossier(&self, id: Uuid, update: DossierUpdate) -> StoreResult<Dossier>;

    async fn list_transactions(&self) -> StoreResult<Vec<Transaction>>;
    async fn bulk_create_transactions(&self, batch: Vec<NewTransaction>)
        -> StoreResult<Vec<Transaction>>;
}
