//! Financial transaction types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of financial movement attached to a dossier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTransaction {
    Paiement,
    VirementRecu,
    PrelevementEchoue,
}

impl TypeTransaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTransaction::Paiement => "Paiement",
            TypeTransaction::VirementRecu => "Virement reçu",
            TypeTransaction::PrelevementEchoue => "Prélèvement échoué",
        }
    }
}

/// One financial movement linked to a dossier.
///
/// `actif` decides whether the transaction counts toward balance math:
/// transaction imports set it to `date_transaction >= cutoff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub dossier_id: Uuid,
    pub entreprise_id: Uuid,
    pub type_transaction: TypeTransaction,
    /// Always non-negative; corrections are carried on the dossier instead.
    pub montant: f64,
    pub date_transaction: NaiveDate,
    pub actif: bool,
    pub batch_id: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub dossier_id: Uuid,
    pub entreprise_id: Uuid,
    pub type_transaction: TypeTransaction,
    pub montant: f64,
    pub date_transaction: NaiveDate,
    pub actif: bool,
    pub batch_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_transaction_serializes_snake_case() {
        let json = serde_json::to_value(TypeTransaction::PrelevementEchoue).unwrap();
        assert_eq!(json, "prelevement_echoue");
    }

    #[test]
    fn new_transaction_serializes_to_camel_case() {
        let t = NewTransaction {
            dossier_id: Uuid::nil(),
            entreprise_id: Uuid::nil(),
            type_transaction: TypeTransaction::VirementRecu,
            montant: 250.0,
            date_transaction: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            actif: true,
            batch_id: "IMPORT_20240115_093000".into(),
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["typeTransaction"], "virement_recu");
        assert_eq!(json["dateTransaction"], "2024-01-15");
        assert_eq!(json["actif"], true);
    }
}
