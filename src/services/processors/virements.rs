//! Incoming wire-transfer import processor.
//!
//! Bank statement exports that mix every account movement together; only
//! rows categorized `RECOVERY REPAYMENTS` belong to us. Matching rows become
//! `VirementRecu` transactions on the company's latest dossier, classified
//! against the cutoff like direct debits. A received wire can never be
//! negative.

use tracing::debug;

use crate::services::columns::resolve;
use crate::services::normalize::{parse_amount, parse_date};
use crate::services::tokenizer::ParsedCsv;
use crate::types::{
    ImportConfig, ImportPlan, ImportType, NewTransaction, RowError, TypeTransaction,
};

use super::{row_error, Processor, ReferenceData};

const COL_CATEGORY: &[&str] = &["category", "catégorie"];
const COL_COMPANY: &[&str] = &[
    "hubspot id",
    "hubspot company id",
    "record id - company",
    "company id",
];
const COL_DATE: &[&str] = &["date", "value date", "transaction date"];
const COL_MONTANT: &[&str] = &["amount", "montant", "credit"];

const RECOVERY_CATEGORY: &str = "recovery repayments";

pub struct VirementsProcessor;

impl Processor for VirementsProcessor {
    fn import_type(&self) -> ImportType {
        ImportType::Virements
    }

    fn process(
        &self,
        data: &ParsedCsv,
        refs: &ReferenceData,
        config: &ImportConfig,
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();

        let Some(cutoff) = config.cutoff_date else {
            plan.total = data.rows.len();
            plan.errors.push(RowError {
                line: 0,
                row: serde_json::Value::Null,
                reason: "Date de coupure requise pour un import de virements".into(),
            });
            return plan;
        };

        // Other bank categories are not errors, just someone else's rows.
        let rows: Vec<_> = data
            .rows
            .iter()
            .filter(|row| {
                resolve(row, COL_CATEGORY)
                    .is_some_and(|c| c.eq_ignore_ascii_case(RECOVERY_CATEGORY))
            })
            .collect();
        let ignored = data.rows.len() - rows.len();
        if ignored > 0 {
            debug!(ignored, "lignes hors catégorie recouvrement ignorées");
        }
        plan.total = rows.len();

        for row in rows {
            let Some(company_id) = resolve(row, COL_COMPANY) else {
                plan.errors
                    .push(row_error(row, "Identifiant HubSpot manquant"));
                continue;
            };
            let Some(entreprise) = refs.entreprise(company_id) else {
                plan.errors.push(row_error(
                    row,
                    format!("Entreprise inconnue: {company_id}"),
                ));
                continue;
            };
            let Some(dossier) = refs.dernier_dossier(entreprise.id) else {
                plan.errors.push(row_error(
                    row,
                    format!("Aucun dossier pour l'entreprise {}", entreprise.nom),
                ));
                continue;
            };

            let Some(date) = resolve(row, COL_DATE).and_then(parse_date) else {
                plan.errors
                    .push(row_error(row, "Date invalide ou manquante"));
                continue;
            };

            let montant = parse_amount(resolve(row, COL_MONTANT).unwrap_or_default());
            if montant == 0.0 {
                plan.errors.push(row_error(row, "Montant invalide ou nul"));
                continue;
            }
            if montant < 0.0 {
                plan.errors
                    .push(row_error(row, "Montant négatif pour un virement reçu"));
                continue;
            }

            let actif = date >= cutoff;
            if actif {
                plan.actifs += 1;
            } else {
                plan.historiques += 1;
            }

            plan.transactions.push(NewTransaction {
                dossier_id: dossier.id,
                entreprise_id: entreprise.id,
                type_transaction: TypeTransaction::VirementRecu,
                montant,
                date_transaction: date,
                actif,
                batch_id: config.batch_id.clone(),
            });
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::test_support::{dossier, entreprise, parse, refs};
    use super::*;
    use crate::types::ImportConfig;

    fn cutoff_config() -> ImportConfig {
        ImportConfig::new(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            Some("IMPORT_TEST".into()),
        )
    }

    #[test]
    fn only_recovery_rows_are_considered() {
        let e = entreprise("42", "Dupont SARL");
        let d = dossier(&e, 1000.0);
        let csv = "Category,HubSpot ID,Date,Amount\n\
                   OFFICE SUPPLIES,42,2024-02-10,19.99\n\
                   Recovery Repayments,42,2024-02-12,300.00\n\
                   PAYROLL,42,2024-02-13,2500.00\n";
        let plan =
            VirementsProcessor.process(&parse(csv), &refs(vec![e], vec![d]), &cutoff_config());

        // Filtered-out bank rows do not count toward the run total.
        assert_eq!(plan.total, 1);
        assert_eq!(plan.transactions.len(), 1);
        assert_eq!(plan.transactions[0].montant, 300.0);
        assert_eq!(
            plan.transactions[0].type_transaction,
            TypeTransaction::VirementRecu
        );
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn negative_wire_is_an_error() {
        let e = entreprise("42", "Dupont SARL");
        let d = dossier(&e, 1000.0);
        let csv = "Category,HubSpot ID,Date,Amount\n\
                   RECOVERY REPAYMENTS,42,2024-02-12,-300.00\n";
        let plan =
            VirementsProcessor.process(&parse(csv), &refs(vec![e], vec![d]), &cutoff_config());

        assert!(plan.transactions.is_empty());
        assert_eq!(plan.errors.len(), 1);
        assert_eq!(plan.errors[0].reason, "Montant négatif pour un virement reçu");
    }

    #[test]
    fn cutoff_splits_active_and_historical() {
        let e = entreprise("42", "Dupont SARL");
        let d = dossier(&e, 1000.0);
        let csv = "Category,HubSpot ID,Date,Amount\n\
                   RECOVERY REPAYMENTS,42,2023-12-31,100.00\n\
                   RECOVERY REPAYMENTS,42,2024-01-01,100.00\n";
        let plan =
            VirementsProcessor.process(&parse(csv), &refs(vec![e], vec![d]), &cutoff_config());

        assert_eq!(plan.historiques, 1);
        assert_eq!(plan.actifs, 1);
        assert!(!plan.transactions[0].actif);
        assert!(plan.transactions[1].actif);
    }
}
