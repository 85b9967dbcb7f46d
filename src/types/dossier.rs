//! Recovery case (dossier) types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recovery stage of a dossier.
///
/// Imported deal stages are mapped into this enum by the keyword table in
/// `services::status`; records created outside an import default to
/// `PendingAssignation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatutRecouvrement {
    PendingAssignation,
    Assigne,
    RelanceUn,
    RelanceDeux,
    RelanceTrois,
    MiseEnDemeure,
    NegociationEnCours,
    PromesseDePaiement,
    PlanRemboursementEnCours,
    PlanRemboursementConclu,
    PaiementPartiel,
    Paye,
    Conteste,
    Litige,
    ProcedureJudiciaire,
    ProcedureCollective,
    Insolvable,
    Irrecouvrable,
    Clos,
}

impl StatutRecouvrement {
    /// Operator-facing label, as shown in the results view.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatutRecouvrement::PendingAssignation => "PENDING ASSIGNATION",
            StatutRecouvrement::Assigne => "Assigné",
            StatutRecouvrement::RelanceUn => "R1",
            StatutRecouvrement::RelanceDeux => "R2",
            StatutRecouvrement::RelanceTrois => "R3",
            StatutRecouvrement::MiseEnDemeure => "Mise en demeure",
            StatutRecouvrement::NegociationEnCours => "Négociation en cours",
            StatutRecouvrement::PromesseDePaiement => "Promesse de paiement",
            StatutRecouvrement::PlanRemboursementEnCours => "Plan de remboursement en cours",
            StatutRecouvrement::PlanRemboursementConclu => "Plan de remboursement conclu",
            StatutRecouvrement::PaiementPartiel => "Paiement partiel",
            StatutRecouvrement::Paye => "Payé",
            StatutRecouvrement::Conteste => "Contesté",
            StatutRecouvrement::Litige => "Litige",
            StatutRecouvrement::ProcedureJudiciaire => "Procédure judiciaire",
            StatutRecouvrement::ProcedureCollective => "Procédure collective",
            StatutRecouvrement::Insolvable => "Insolvable",
            StatutRecouvrement::Irrecouvrable => "Irrécouvrable",
            StatutRecouvrement::Clos => "Clos",
        }
    }
}

/// Origin platform of a claim (the `provider_v2` column of deal exports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Apporteur {
    Defacto,
    Silvr,
    Karmen,
    Marketplace,
    Autre,
}

impl Apporteur {
    pub fn as_str(&self) -> &'static str {
        match self {
            Apporteur::Defacto => "defacto",
            Apporteur::Silvr => "silvr",
            Apporteur::Karmen => "karmen",
            Apporteur::Marketplace => "marketplace",
            Apporteur::Autre => "autre",
        }
    }

    /// Free-text provider label → enum, defaulting to `Autre`.
    pub fn from_raw(s: &str) -> Apporteur {
        match s.trim().to_lowercase().as_str() {
            "defacto" => Apporteur::Defacto,
            "silvr" => Apporteur::Silvr,
            "karmen" => Apporteur::Karmen,
            "marketplace" | "place de marché" | "place de marche" => Apporteur::Marketplace,
            _ => Apporteur::Autre,
        }
    }
}

/// Recovery case entity (DossierRecouvrement).
///
/// One dossier per company per claims import; `montant_initial` is the sum
/// of all claim rows for that company, never a per-row amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dossier {
    pub id: Uuid,
    pub entreprise_id: Uuid,
    pub hubspot_id: String,
    pub montant_initial: f64,
    pub apporteur: Apporteur,
    pub statut: StatutRecouvrement,
    pub statut_depuis: NaiveDate,
    pub notes: Option<String>,
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a dossier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDossier {
    pub entreprise_id: Uuid,
    pub hubspot_id: String,
    pub montant_initial: f64,
    pub apporteur: Apporteur,
    pub statut: StatutRecouvrement,
    pub statut_depuis: NaiveDate,
    pub notes: Option<String>,
    pub batch_id: String,
}

/// Partial update of a dossier. Only the provided fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierUpdate {
    pub montant_initial: Option<f64>,
    pub statut: Option<StatutRecouvrement>,
    pub notes: Option<String>,
}
