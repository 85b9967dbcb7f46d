//! Status-conflict resolution.
//!
//! The Creances processor defers companies whose claim rows disagree on the
//! deal stage. Once the operator has picked a final status (and optionally
//! adjusted the merged amount), this module turns each decided conflict into
//! the dossier the processor withheld. Conflicts without a decision are
//! passed through untouched and never persisted.

use chrono::Utc;
use tracing::debug;

use crate::types::{ConflictDecision, ImportConfig, NewDossier, StatusConflict};

/// Apply operator decisions to pending conflicts. Returns the dossiers to
/// create and the conflicts still waiting for a decision.
pub fn apply_decisions(
    conflicts: &[StatusConflict],
    decisions: &[ConflictDecision],
    config: &ImportConfig,
) -> (Vec<NewDossier>, Vec<StatusConflict>) {
    let mut dossiers = Vec::new();
    let mut unresolved = Vec::new();

    for conflict in conflicts {
        let decision = decisions
            .iter()
            .find(|d| d.hubspot_id == conflict.hubspot_id);
        let Some(decision) = decision else {
            debug!(hubspot_id = %conflict.hubspot_id, "conflit sans décision, reporté");
            unresolved.push(conflict.clone());
            continue;
        };

        let apporteur = conflict
            .claims
            .first()
            .map(|c| c.apporteur)
            .unwrap_or(crate::types::Apporteur::Autre);

        dossiers.push(NewDossier {
            entreprise_id: conflict.entreprise_id,
            hubspot_id: conflict.hubspot_id.clone(),
            montant_initial: decision.montant,
            apporteur,
            statut: decision.statut,
            statut_depuis: Utc::now().date_naive(),
            notes: Some(merge_note(conflict)),
            batch_id: config.batch_id.clone(),
        });
    }

    (dossiers, unresolved)
}

/// Audit note recording what was merged, e.g.
/// `Fusion de 2 créances: 100.00 € (R1) + 50.00 € (R2)`.
fn merge_note(conflict: &StatusConflict) -> String {
    let parts: Vec<String> = conflict
        .claims
        .iter()
        .map(|c| format!("{:.2} € ({})", c.montant, c.statut_brut))
        .collect();
    format!(
        "Fusion de {} créances: {}",
        conflict.claims.len(),
        parts.join(" + ")
    )
}
