//! Bulk persistence gateway.
//!
//! Takes the plan a processor produced and pushes it through the
//! [`Datastore`] in chunks, with rate-limit aware retries. A failed batch
//! becomes one aggregate error entry covering the whole chunk, not one per
//! record. Dossier amount corrections are applied one by one with a pause
//! between updates, so a burst of corrections does not trip the backend's
//! rate limiter to begin with.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::store::{Datastore, StoreError, StoreResult};
use crate::types::{DossierUpdate, ImportPlan, ImportResult, RowError};

/// Persistence tuning knobs, sourced from worker configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub batch_size: usize,
    /// Pause between consecutive dossier updates.
    pub update_delay: Duration,
    pub retry_attempts: u32,
    /// Base retry pause; attempt N waits N times this.
    pub retry_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            update_delay: Duration::from_millis(300),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Retry `op` on rate-limit errors, waiting `attempt * base_delay` before
/// each retry. Any other error is returned immediately.
pub async fn with_retry<T, F, Fut>(mut op: F, max_attempts: u32, base_delay: Duration) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(StoreError::RateLimited) if attempt < max_attempts => {
                warn!(attempt, "limite de débit atteinte, nouvelle tentative");
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

pub struct BulkGateway {
    store: Arc<dyn Datastore>,
    config: GatewayConfig,
}

impl BulkGateway {
    pub fn new(store: Arc<dyn Datastore>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// Persist everything the plan contains and fold the outcome into an
    /// [`ImportResult`]. Row-level errors carried by the plan are kept;
    /// batch failures are appended as aggregate entries.
    pub async fn persist(&self, plan: ImportPlan) -> ImportResult {
        let mut result = ImportResult {
            total: plan.total,
            success: plan.already_present,
            errors: plan.errors,
            actifs: plan.actifs,
            historiques: plan.historiques,
            a_reaffecter: plan.to_reassign,
            conflits: plan.conflicts.len(),
        };

        self.persist_chunked(plan.entreprises, &mut result, |store, batch| async move {
            store.bulk_create_entreprises(batch).await.map(|v| v.len())
        })
        .await;
        self.persist_chunked(plan.contacts, &mut result, |store, batch| async move {
            store.bulk_create_contacts(batch).await.map(|v| v.len())
        })
        .await;
        self.persist_chunked(plan.dossiers, &mut result, |store, batch| async move {
            store.bulk_create_dossiers(batch).await.map(|v| v.len())
        })
        .await;
        self.persist_chunked(plan.transactions, &mut result, |store, batch| async move {
            store.bulk_create_transactions(batch).await.map(|v| v.len())
        })
        .await;

        self.apply_corrections(&plan.corrections, &mut result).await;

        info!(
            total = result.total,
            reussis = result.success,
            erreurs = result.errors.len(),
            conflits = result.conflits,
            "persistance terminée"
        );
        result
    }

    async fn persist_chunked<T, F, Fut>(
        &self,
        records: Vec<T>,
        result: &mut ImportResult,
        create: F,
    ) where
        T: Clone,
        F: Fn(Arc<dyn Datastore>, Vec<T>) -> Fut,
        Fut: Future<Output = StoreResult<usize>>,
    {
        for chunk in records.chunks(self.config.batch_size.max(1)) {
            let outcome = with_retry(
                || create(self.store.clone(), chunk.to_vec()),
                self.config.retry_attempts,
                self.config.retry_delay,
            )
            .await;

            match outcome {
                Ok(created) => result.success += created,
                Err(e) => {
                    warn!(taille = chunk.len(), erreur = %e, "lot non persisté");
                    result.errors.push(RowError {
                        line: 0,
                        row: serde_json::Value::Null,
                        reason: format!("Lot de {} enregistrements non persisté: {e}", chunk.len()),
                    });
                }
            }
        }
    }

    /// Corrections are deltas; several corrections to the same dossier in one
    /// run must compound, so amounts are tracked locally across updates.
    async fn apply_corrections(
        &self,
        corrections: &[crate::types::AmountCorrection],
        result: &mut ImportResult,
    ) {
        if corrections.is_empty() {
            return;
        }

        let mut montants: HashMap<Uuid, f64> = match self.store.list_dossiers().await {
            Ok(dossiers) => dossiers
                .into_iter()
                .map(|d| (d.id, d.montant_initial))
                .collect(),
            Err(e) => {
                warn!(erreur = %e, "lecture des dossiers impossible, corrections abandonnées");
                result.errors.push(RowError {
                    line: 0,
                    row: serde_json::Value::Null,
                    reason: format!("Corrections non appliquées: {e}"),
                });
                return;
            }
        };

        let mut first = true;
        for correction in corrections {
            if !first {
                tokio::time::sleep(self.config.update_delay).await;
            }
            first = false;

            let Some(montant) = montants.get_mut(&correction.dossier_id) else {
                result.errors.push(RowError {
                    line: 0,
                    row: serde_json::Value::Null,
                    reason: format!("Dossier introuvable: {}", correction.dossier_id),
                });
                continue;
            };
            let nouveau = *montant + correction.delta;

            let update = DossierUpdate {
                montant_initial: Some(nouveau),
                ..Default::default()
            };
            let outcome = with_retry(
                || self.store.update_dossier(correction.dossier_id, update.clone()),
                self.config.retry_attempts,
                self.config.retry_delay,
            )
            .await;

            match outcome {
                Ok(_) => *montant = nouveau,
                Err(e) => {
                    warn!(dossier = %correction.dossier_id, erreur = %e, "correction non appliquée");
                    result.errors.push(RowError {
                        line: 0,
                        row: serde_json::Value::Null,
                        reason: format!(
                            "Correction du dossier {} non appliquée: {e}",
                            correction.dossier_id
                        ),
                    });
                }
            }
        }
    }
}
