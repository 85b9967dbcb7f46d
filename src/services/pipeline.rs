//! Import pipeline orchestrator.
//!
//! Ties the stages together: tokenize, detect the import type (or honor the
//! operator's override), load reference data, run the matching processor,
//! then hand the plan to the gateway. Detected status conflicts are returned
//! alongside the result so the caller can collect decisions and finish the
//! run through [`ImportPipeline::finalize_conflicts`].

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::store::Datastore;
use crate::types::{
    ConflictDecision, ConflictState, ImportConfig, ImportPlan, ImportResult, ImportType,
    StatusConflict,
};

use super::conflicts::apply_decisions;
use super::detect::detect_import_type;
use super::gateway::{BulkGateway, GatewayConfig};
use super::processors::{processor_for, ReferenceData};
use super::tokenizer::tokenize;

/// Outcome of a pipeline run: the persisted result plus any conflicts that
/// still await an operator decision.
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub result: ImportResult,
    pub conflicts: Vec<StatusConflict>,
}

pub struct ImportPipeline {
    store: Arc<dyn Datastore>,
    gateway: BulkGateway,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn Datastore>, gateway_config: GatewayConfig) -> Self {
        let gateway = BulkGateway::new(store.clone(), gateway_config);
        Self { store, gateway }
    }

    /// Run a full import over raw file content. `forced` bypasses header
    /// detection when the operator knows the type.
    pub async fn run(
        &self,
        content: &str,
        forced: Option<ImportType>,
        config: &ImportConfig,
    ) -> Result<ImportRun> {
        let parsed = tokenize(content)?;

        let kind = match forced.or_else(|| detect_import_type(&parsed.headers)) {
            Some(kind) => kind,
            None => bail!("Type d'import non reconnu: en-têtes {:?}", parsed.headers),
        };
        if kind.requires_cutoff() && config.cutoff_date.is_none() {
            bail!(
                "Date de coupure requise pour un import de type {}",
                kind.as_str()
            );
        }

        info!(
            kind = kind.as_str(),
            lignes = parsed.rows.len(),
            delimiteur = %parsed.delimiter,
            batch_id = %config.batch_id,
            "import démarré"
        );

        let (entreprises, dossiers) = futures::try_join!(
            self.store.list_entreprises(),
            self.store.list_dossiers()
        )?;
        let refs = ReferenceData::new(entreprises, dossiers);

        let mut plan = processor_for(kind).process(&parsed, &refs, config);

        // Lines the tokenizer rejected still count toward the run total and
        // surface in the same error report as business failures.
        plan.total += parsed.errors.len();
        let mut errors = parsed.errors;
        errors.append(&mut plan.errors);
        plan.errors = errors;

        // Handing conflicts to the caller is what moves them to the operator
        // queue.
        let conflicts: Vec<StatusConflict> = plan
            .conflicts
            .iter()
            .cloned()
            .map(|mut c| {
                c.state = ConflictState::AwaitingDecision;
                c
            })
            .collect();
        let result = self.gateway.persist(plan).await;

        info!(
            kind = kind.as_str(),
            total = result.total,
            reussis = result.success,
            erreurs = result.errors.len(),
            conflits = result.conflits,
            "import terminé"
        );
        Ok(ImportRun { result, conflicts })
    }

    /// Persist the dossiers unlocked by operator decisions. Undecided
    /// conflicts come back untouched.
    pub async fn finalize_conflicts(
        &self,
        conflicts: &[StatusConflict],
        decisions: &[ConflictDecision],
        config: &ImportConfig,
    ) -> Result<ImportRun> {
        let (dossiers, unresolved) = apply_decisions(conflicts, decisions, config);

        let mut plan = ImportPlan::default();
        plan.total = dossiers.len();
        plan.dossiers = dossiers;
        let result = self.gateway.persist(plan).await;

        info!(
            resolus = result.success,
            en_attente = unresolved.len(),
            "résolution de conflits terminée"
        );
        Ok(ImportRun {
            result,
            conflicts: unresolved,
        })
    }
}
