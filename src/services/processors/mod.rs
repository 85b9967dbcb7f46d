//! Type-specific import processors.
//!
//! One strategy struct per known export shape, all behind the [`Processor`]
//! trait. Processors are pure: they read tokenized rows plus pre-loaded
//! reference data and produce an [`ImportPlan`]; nothing is persisted here.
//! Rows are walked strictly in input order — later grouping (Creances) and
//! the user-facing error report both depend on it.

mod contacts;
mod creances;
mod entreprises;
mod prelevements;
mod virements;

pub use contacts::ContactsProcessor;
pub use creances::CreancesProcessor;
pub use entreprises::EntreprisesProcessor;
pub use prelevements::PrelevementsProcessor;
pub use virements::VirementsProcessor;

use std::collections::HashMap;

use uuid::Uuid;

use crate::types::{Dossier, Entreprise, ImportConfig, ImportPlan, ImportType, RowError};

use super::tokenizer::{ParsedCsv, RawRow};

/// Reference collections loaded once before row processing begins.
pub struct ReferenceData {
    entreprises_by_hubspot: HashMap<String, Entreprise>,
    dernier_dossier: HashMap<Uuid, Dossier>,
}

impl ReferenceData {
    pub fn new(entreprises: Vec<Entreprise>, dossiers: Vec<Dossier>) -> Self {
        let entreprises_by_hubspot = entreprises
            .into_iter()
            .map(|e| (e.hubspot_id.clone(), e))
            .collect();

        // Keep the most recently created dossier per company; later entries
        // win ties so insertion order is a stable fallback.
        let mut dernier_dossier: HashMap<Uuid, Dossier> = HashMap::new();
        for dossier in dossiers {
            match dernier_dossier.get(&dossier.entreprise_id) {
                Some(existing) if existing.created_at > dossier.created_at => {}
                _ => {
                    dernier_dossier.insert(dossier.entreprise_id, dossier);
                }
            }
        }

        Self { entreprises_by_hubspot, dernier_dossier }
    }

    pub fn entreprise(&self, hubspot_id: &str) -> Option<&Entreprise> {
        self.entreprises_by_hubspot.get(hubspot_id.trim())
    }

    pub fn dernier_dossier(&self, entreprise_id: Uuid) -> Option<&Dossier> {
        self.dernier_dossier.get(&entreprise_id)
    }
}

/// One import strategy: consumes tokenized rows and produces a plan.
pub trait Processor {
    fn import_type(&self) -> ImportType;
    fn process(&self, data: &ParsedCsv, refs: &ReferenceData, config: &ImportConfig)
        -> ImportPlan;
}

pub fn processor_for(kind: ImportType) -> Box<dyn Processor> {
    match kind {
        ImportType::Entreprises => Box::new(EntreprisesProcessor),
        ImportType::Contacts => Box::new(ContactsProcessor),
        ImportType::Prelevements => Box::new(PrelevementsProcessor),
        ImportType::Virements => Box::new(VirementsProcessor),
        ImportType::Creances => Box::new(CreancesProcessor),
    }
}

pub(crate) fn row_error(row: &RawRow, reason: impl Into<String>) -> RowError {
    RowError {
        line: row.line,
        row: row.to_json(),
        reason: reason.into(),
    }
}
