//! Import run types — configuration, results, conflicts, plans

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    Apporteur, NewContact, NewDossier, NewEntreprise, NewTransaction, StatutRecouvrement,
};

/// The five known spreadsheet shapes. Detection is header-based
/// (`services::detect`); the operator can force a type from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Entreprises,
    Contacts,
    Prelevements,
    Virements,
    Creances,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Entreprises => "entreprises",
            ImportType::Contacts => "contacts",
            ImportType::Prelevements => "prelevements",
            ImportType::Virements => "virements",
            ImportType::Creances => "creances",
        }
    }

    /// Transaction imports classify rows against a cutoff date and cannot
    /// run without one.
    pub fn requires_cutoff(&self) -> bool {
        matches!(self, ImportType::Prelevements | ImportType::Virements)
    }
}

/// Per-run configuration supplied by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// Transactions dated before this are persisted but flagged inactive.
    pub cutoff_date: Option<NaiveDate>,
    /// Stamped on every record created by this run, for traceability.
    pub batch_id: String,
}

impl ImportConfig {
    pub fn new(cutoff_date: Option<NaiveDate>, batch_id: Option<String>) -> Self {
        Self {
            cutoff_date,
            batch_id: batch_id.unwrap_or_else(default_batch_id),
        }
    }
}

/// Machine-generated batch id, e.g. `IMPORT_20240115_093000`.
pub fn default_batch_id() -> String {
    format!("IMPORT_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// One row-level failure: the offending source row plus a human-readable
/// reason. Collected, never thrown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    /// JSON rendering of the raw row, for the downloadable error report.
    pub row: serde_json::Value,
    pub reason: String,
}

/// Final summary of an import run, consumed by the results display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total: usize,
    pub success: usize,
    pub errors: Vec<RowError>,
    /// Transactions counting toward balance math (transaction imports only).
    pub actifs: usize,
    /// Transactions persisted but flagged inactive.
    pub historiques: usize,
    /// Companies imported with an owner that could not be mapped to an agent.
    pub a_reaffecter: Vec<String>,
    /// Companies deferred to manual conflict resolution (claims imports only).
    pub conflits: usize,
}

// =============================================================================
// STATUS CONFLICTS
// =============================================================================

/// Lifecycle of an ambiguous multi-status company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictState {
    Detected,
    AwaitingDecision,
    Resolved,
}

/// One claim row participating in a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictClaim {
    pub montant: f64,
    pub statut_brut: String,
    pub apporteur: Apporteur,
}

/// A company whose claim rows disagree on recovery status.
///
/// Transient: lives between the Creances processor and the operator's
/// decision, never persisted as such.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConflict {
    pub hubspot_id: String,
    pub entreprise_id: Uuid,
    pub claims: Vec<ConflictClaim>,
    /// Distinct raw statuses observed, post-normalization.
    pub statuses: Vec<String>,
    /// Sum of all candidate amounts — the suggested merged amount.
    pub total: f64,
    pub state: ConflictState,
}

/// Operator decision for one conflicted company: a chosen final status and
/// a merged amount (defaults to the candidate sum in the UI, but the value
/// here is authoritative).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDecision {
    pub hubspot_id: String,
    pub statut: StatutRecouvrement,
    pub montant: f64,
}

// =============================================================================
// IMPORT PLAN
// =============================================================================

/// Pending correction of a dossier's claimed amount (negative direct-debit
/// rows). Applied one at a time by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountCorrection {
    pub dossier_id: Uuid,
    pub delta: f64,
}

/// Everything a processor decided to do, before anything is persisted.
///
/// Processors fill the record lists for their own entity kind and leave the
/// rest empty; the gateway persists whatever is present.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub entreprises: Vec<NewEntreprise>,
    pub contacts: Vec<NewContact>,
    pub dossiers: Vec<NewDossier>,
    pub transactions: Vec<NewTransaction>,
    pub corrections: Vec<AmountCorrection>,
    pub errors: Vec<RowError>,
    pub conflicts: Vec<StatusConflict>,
    pub to_reassign: Vec<String>,
    /// Rows considered by the processor (post business filter).
    pub total: usize,
    /// Rows satisfied without creating anything (e.g. company already known).
    pub already_present: usize,
    pub actifs: usize,
    pub historiques: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_id_has_expected_shape() {
        let id = default_batch_id();
        assert!(id.starts_with("IMPORT_"));
        // IMPORT_ + yyyyMMdd + _ + HHmmss
        assert_eq!(id.len(), "IMPORT_".len() + 8 + 1 + 6);
    }

    #[test]
    fn config_generates_batch_id_when_absent() {
        let c = ImportConfig::new(None, None);
        assert!(c.batch_id.starts_with("IMPORT_"));
        let c = ImportConfig::new(None, Some("BATCH_X".into()));
        assert_eq!(c.batch_id, "BATCH_X");
    }

    #[test]
    fn cutoff_required_for_transaction_imports_only() {
        assert!(ImportType::Prelevements.requires_cutoff());
        assert!(ImportType::Virements.requires_cutoff());
        assert!(!ImportType::Entreprises.requires_cutoff());
        assert!(!ImportType::Contacts.requires_cutoff());
        assert!(!ImportType::Creances.requires_cutoff());
    }

    #[test]
    fn import_result_serializes_to_camel_case() {
        let r = ImportResult {
            total: 10,
            success: 8,
            a_reaffecter: vec!["Dupont SARL".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["total"], 10);
        assert_eq!(json["aReaffecter"][0], "Dupont SARL");
        assert_eq!(json["conflits"], 0);
    }
}
