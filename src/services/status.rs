//! Deal-stage → recovery-status mapping.
//!
//! A priority-ordered substring table over the lowercased input. Order is
//! part of the contract: several keywords are substrings of longer, more
//! specific stage names ("repayment plan ongoing" vs "repayment plan"),
//! so do not alphabetize or otherwise reorder the list.

use crate::types::StatutRecouvrement;

const STAGE_KEYWORDS: &[(&str, StatutRecouvrement)] = &[
    ("repayment plan ongoing", StatutRecouvrement::PlanRemboursementEnCours),
    ("plan de remboursement en cours", StatutRecouvrement::PlanRemboursementEnCours),
    ("repayment plan agreed", StatutRecouvrement::PlanRemboursementConclu),
    ("repayment plan", StatutRecouvrement::PlanRemboursementConclu),
    ("partially paid", StatutRecouvrement::PaiementPartiel),
    ("partial payment", StatutRecouvrement::PaiementPartiel),
    ("paiement partiel", StatutRecouvrement::PaiementPartiel),
    ("paid in full", StatutRecouvrement::Paye),
    ("paid", StatutRecouvrement::Paye),
    ("payé", StatutRecouvrement::Paye),
    ("promise to pay", StatutRecouvrement::PromesseDePaiement),
    ("promesse", StatutRecouvrement::PromesseDePaiement),
    ("negotiation", StatutRecouvrement::NegociationEnCours),
    ("négociation", StatutRecouvrement::NegociationEnCours),
    ("formal notice", StatutRecouvrement::MiseEnDemeure),
    ("mise en demeure", StatutRecouvrement::MiseEnDemeure),
    ("insolvency proceedings", StatutRecouvrement::ProcedureCollective),
    ("collective proceedings", StatutRecouvrement::ProcedureCollective),
    ("procédure collective", StatutRecouvrement::ProcedureCollective),
    ("insolvent", StatutRecouvrement::Insolvable),
    ("insolvable", StatutRecouvrement::Insolvable),
    ("legal action", StatutRecouvrement::ProcedureJudiciaire),
    ("procédure judiciaire", StatutRecouvrement::ProcedureJudiciaire),
    ("litigation", StatutRecouvrement::Litige),
    ("contentieux", StatutRecouvrement::Litige),
    ("dispute", StatutRecouvrement::Conteste),
    ("contesté", StatutRecouvrement::Conteste),
    ("write-off", StatutRecouvrement::Irrecouvrable),
    ("written off", StatutRecouvrement::Irrecouvrable),
    ("irrécouvrable", StatutRecouvrement::Irrecouvrable),
    ("third reminder", StatutRecouvrement::RelanceTrois),
    ("second reminder", StatutRecouvrement::RelanceDeux),
    ("first reminder", StatutRecouvrement::RelanceUn),
    ("closed", StatutRecouvrement::Clos),
    ("clos", StatutRecouvrement::Clos),
    ("assigned", StatutRecouvrement::Assigne),
    ("assigné", StatutRecouvrement::Assigne),
    ("r3", StatutRecouvrement::RelanceTrois),
    ("r2", StatutRecouvrement::RelanceDeux),
    ("r1", StatutRecouvrement::RelanceUn),
];

/// First keyword found as a substring of the lowercased input wins;
/// unmatched input defaults to `PendingAssignation`.
pub fn map_deal_stage(raw: &str) -> StatutRecouvrement {
    let normalized = raw.trim().to_lowercase();
    for (keyword, statut) in STAGE_KEYWORDS {
        if normalized.contains(keyword) {
            return *statut;
        }
    }
    if !normalized.is_empty() {
        tracing::debug!(
            "Deal stage non reconnu '{}', PENDING ASSIGNATION par défaut",
            raw.trim()
        );
    }
    StatutRecouvrement::PendingAssignation
}
