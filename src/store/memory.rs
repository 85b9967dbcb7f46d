//! In-memory datastore.
//!
//! Used by unit tests and as the state behind [`super::JsonStore`]. Failure
//! injection is scripted: tests can queue a number of `RateLimited` or
//! backend failures to exercise the gateway's retry and aggregate-error
//! paths.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::types::{
    Contact, Dossier, DossierUpdate, Entreprise, NewContact, NewDossier, NewEntreprise,
    NewTransaction, Transaction,
};

use super::{Datastore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub(crate) struct State {
    pub entreprises: Vec<Entreprise>,
    pub contacts: Vec<Contact>,
    pub dossiers: Vec<Dossier>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct Faults {
    rate_limited_updates: u32,
    failing_bulks: u32,
}

/// In-memory store, safe to share via `Arc` across tasks.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) state: Mutex<State>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` `update_dossier` calls answer `RateLimited`.
    pub fn fail_next_updates_rate_limited(&self, n: u32) {
        self.faults.lock().rate_limited_updates = n;
    }

    /// The next `n` bulk-create calls (any entity) fail outright.
    pub fn fail_next_bulk_creates(&self, n: u32) {
        self.faults.lock().failing_bulks = n;
    }

    fn take_bulk_fault(&self) -> Option<StoreError> {
        let mut faults = self.faults.lock();
        if faults.failing_bulks > 0 {
            faults.failing_bulks -= 1;
            Some(StoreError::Backend("panne simulée".into()))
        } else {
            None
        }
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn list_entreprises(&self) -> StoreResult<Vec<Entreprise>> {
        Ok(self.state.lock().entreprises.clone())
    }

    async fn bulk_create_entreprises(
        &self,
        batch: Vec<NewEntreprise>,
    ) -> StoreResult<Vec<Entreprise>> {
        if let Some(err) = self.take_bulk_fault() {
            return Err(err);
        }
        let mut state = self.state.lock();
        let created: Vec<Entreprise> = batch
            .into_iter()
            .map(|n| Entreprise {
                id: Uuid::new_v4(),
                hubspot_id: n.hubspot_id,
                nom: n.nom,
                siren: n.siren,
                pays: n.pays,
                charge_de_compte: n.charge_de_compte,
                created_at: Utc::now(),
            })
            .collect();
        state.entreprises.extend(created.clone());
        Ok(created)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<Contact>> {
        Ok(self.state.lock().contacts.clone())
    }

    async fn bulk_create_contacts(&self, batch: Vec<NewContact>) -> StoreResult<Vec<Contact>> {
        if let Some(err) = self.take_bulk_fault() {
            return Err(err);
        }
        let mut state = self.state.lock();
        let created: Vec<Contact> = batch
            .into_iter()
            .map(|n| Contact {
                id: Uuid::new_v4(),
                entreprise_id: n.entreprise_id,
                prenom: n.prenom,
                nom: n.nom,
                email: n.email,
                telephone: n.telephone,
                mobile: n.mobile,
                created_at: Utc::now(),
            })
            .collect();
        state.contacts.extend(created.clone());
        Ok(created)
    }

    async fn list_dossiers(&self) -> StoreResult<Vec<Dossier>> {
        Ok(self.state.lock().dossiers.clone())
    }

    async fn bulk_create_dossiers(&self, batch: Vec<NewDossier>) -> StoreResult<Vec<Dossier>> {
        if let Some(err) = self.take_bulk_fault() {
            return Err(err);
        }
        let mut state = self.state.lock();
        let created: Vec<Dossier> = batch
            .into_iter()
            .map(|n| Dossier {
                id: Uuid::new_v4(),
                entreprise_id: n.entreprise_id,
                hubspot_id: n.hubspot_id,
                montant_initial: n.montant_initial,
                apporteur: n.apporteur,
                statut: n.statut,
                statut_depuis: n.statut_depuis,
                notes: n.notes,
                batch_id: n.batch_id,
                created_at: Utc::now(),
            })
            .collect();
        state.dossiers.extend(created.clone());
        Ok(created)
    }

    async fn update_dossier(&self, id: Uuid, update: DossierUpdate) -> StoreResult<Dossier> {
        {
            let mut faults = self.faults.lock();
            if faults.rate_limited_updates > 0 {
                faults.rate_limited_updates -= 1;
                return Err(StoreError::RateLimited);
            }
        }
        let mut state = self.state.lock();
        let dossier = state
            .dossiers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("dossier {id}")))?;
        if let Some(montant) = update.montant_initial {
            dossier.montant_initial = montant;
        }
        if let Some(statut) = update.statut {
            dossier.statut = statut;
        }
        if let Some(notes) = update.notes {
            dossier.notes = Some(notes);
        }
        Ok(dossier.clone())
    }

    async fn list_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.state.lock().transactions.clone())
    }

    async fn bulk_create_transactions(
        &self,
        batch: Vec<NewTransaction>,
    ) -> StoreResult<Vec<Transaction>> {
        if let Some(err) = self.take_bulk_fault() {
            return Err(err);
        }
        let mut state = self.state.lock();
        let created: Vec<Transaction> = batch
            .into_iter()
            .map(|n| Transaction {
                id: Uuid::new_v4(),
                dossier_id: n.dossier_id,
                entreprise_id: n.entreprise_id,
                type_transaction: n.type_transaction,
                montant: n.montant,
                date_transaction: n.date_transaction,
                actif: n.actif,
                batch_id: n.batch_id,
                created_at: Utc::now(),
            })
            .collect();
        state.transactions.extend(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pays;

    fn new_entreprise(hubspot_id: &str) -> NewEntreprise {
        NewEntreprise {
            hubspot_id: hubspot_id.into(),
            nom: format!("Société {hubspot_id}"),
            siren: None,
            pays: Pays::France,
            charge_de_compte: None,
        }
    }

    #[tokio::test]
    async fn bulk_create_assigns_ids_and_lists_back() {
        let store = MemoryStore::new();
        let created = store
            .bulk_create_entreprises(vec![new_entreprise("1"), new_entreprise("2")])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(store.list_entreprises().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn scripted_rate_limit_clears_after_n_calls() {
        let store = MemoryStore::new();
        let dossiers = store
            .bulk_create_dossiers(vec![NewDossier {
                entreprise_id: Uuid::new_v4(),
                hubspot_id: "42".into(),
                montant_initial: 100.0,
                apporteur: crate::types::Apporteur::Autre,
                statut: crate::types::StatutRecouvrement::RelanceUn,
                statut_depuis: chrono::Utc::now().date_naive(),
                notes: None,
                batch_id: "B".into(),
            }])
            .await
            .unwrap();

        store.fail_next_updates_rate_limited(2);
        let update = DossierUpdate { montant_initial: Some(90.0), ..Default::default() };
        assert!(matches!(
            store.update_dossier(dossiers[0].id, update.clone()).await,
            Err(StoreError::RateLimited)
        ));
        assert!(matches!(
            store.update_dossier(dossiers[0].id, update.clone()).await,
            Err(StoreError::RateLimited)
        ));
        let updated = store.update_dossier(dossiers[0].id, update).await.unwrap();
        assert_eq!(updated.montant_initial, 90.0);
    }

    #[tokio::test]
    async fn update_unknown_dossier_is_not_found() {
        let store = MemoryStore::new();
        let res = store
            .update_dossier(Uuid::new_v4(), DossierUpdate::default())
            .await;
        assert!(matches!(res, Err(StoreError::NotFound(_))));
    }
}
