//! JSON-file datastore.
//!
//! Backs the standalone CLI: each entity family lives in one JSON file
//! under the data dir, loaded at open and rewritten after every mutation.
//! Durability model matches the worker's job sizes (thousands of records,
//! not millions).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::types::{
    Contact, Dossier, DossierUpdate, Entreprise, NewContact, NewDossier, NewEntreprise,
    NewTransaction, Transaction,
};

use super::memory::MemoryStore;
use super::{Datastore, StoreError, StoreResult};

const ENTREPRISES_FILE: &str = "entreprises.json";
const CONTACTS_FILE: &str = "contacts.json";
const DOSSIERS_FILE: &str = "dossiers.json";
const TRANSACTIONS_FILE: &str = "transactions.json";

pub struct JsonStore {
    dir: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open (or initialize) a store under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("création du répertoire de données {}", dir.display()))?;

        let store = Self { dir, inner: MemoryStore::new() };
        {
            let mut state = store.inner.state.lock();
            state.entreprises = store.load_file(ENTREPRISES_FILE)?;
            state.contacts = store.load_file(CONTACTS_FILE)?;
            state.dossiers = store.load_file(DOSSIERS_FILE)?;
            state.transactions = store.load_file(TRANSACTIONS_FILE)?;
            info!(
                "Données chargées: {} entreprises, {} contacts, {} dossiers, {} transactions",
                state.entreprises.len(),
                state.contacts.len(),
                state.dossiers.len(),
                state.transactions.len()
            );
        }
        Ok(store)
    }

    fn load_file<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("lecture de {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing de {}", path.display()))
    }

    fn save_file<T: Serialize>(&self, name: &str, records: &[T]) -> StoreResult<()> {
        let path = self.dir.join(name);
        let raw = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::write(&path, raw).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn save_all(&self) -> StoreResult<()> {
        let state = self.inner.state.lock();
        self.save_file(ENTREPRISES_FILE, &state.entreprises)?;
        self.save_file(CONTACTS_FILE, &state.contacts)?;
        self.save_file(DOSSIERS_FILE, &state.dossiers)?;
        self.save_file(TRANSACTIONS_FILE, &state.transactions)
    }
}

#[async_trait]
impl Datastore for JsonStore {
    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>> {
        self.inner.list_entreprises().await
    }

    async fn bulk_create_entreprises(
        &self,
        batch: Vec<NewEntreprise>,
    ) -> StoreResult<Vec<Entreprise>> {
        let created = self.inner.bulk_create_entreprises(batch).await?;
        self.save_all()?;
        Ok(created)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        self.inner.list_contacts().await
    }

    async fn bulk_create_contacts(&self, batch: Vec<NewContact>) -> StoreResult<Vec<Contact>> {
        let created = self.inner.bulk_create_contacts(batch).await?;
        self.save_all()?;
        Ok(created)
    }

    async fn list_dossiers(&self) -> StoreResult<Vec<Dossier>> {
        self.inner.list_dossiers().await
    }

    async fn bulk_create_dossiers(&self, batch: Vec<NewDossier>) -> StoreResult<Vec<Dossier>> {
        let created = self.inner.bulk_create_dossiers(batch).await?;
        self.save_all()?;
        Ok(created)
    }

    async fn update_dossier(&self, id: Uuid, update: DossierUpdate) -> StoreResult<Dossier> {
        let updated = self.inner.update_dossier(id, update).await?;
        self.save_all()?;
        Ok(updated)
    }

    async fn list_transactions(&self) -> StoreResult<Vec<Transaction>> {
        self.inner.list_transactions().await
    }

    async fn bulk_create_transactions(
        &self,
        batch: Vec<NewTransaction>,
    ) -> StoreResult<Vec<Transaction>> {
        let created = self.inner.bulk_create_transactions(batch).await?;
        self.save_all()?;
        Ok(created)
    }
}
