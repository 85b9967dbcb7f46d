//! Failed direct-debit import processor.
//!
//! Bank logs of failed SEPA direct debits. Each row becomes a
//! `PrelevementEchoue` transaction on the company's latest dossier; a
//! negative amount additionally corrects the dossier's claimed amount
//! downward, and the transaction itself always carries the absolute value.
//! Rows dated before the cutoff are persisted but flagged inactive.

use crate::services::columns::resolve;
use crate::services::normalize::{parse_amount, parse_date};
use crate::services::tokenizer::ParsedCsv;
use crate::types::{
    AmountCorrection, ImportConfig, ImportPlan, ImportType, NewTransaction, RowError,
    TypeTransaction,
};

use super::{row_error, Processor, ReferenceData};

const COL_COMPANY: &[&str] = &["company id", "record id - company", "hubspot id"];
const COL_DATE: &[&str] = &["log_date", "date", "transaction date"];
const COL_MONTANT: &[&str] = &["amount", "montant"];

pub struct PrelevementsProcessor;

impl Processor for PrelevementsProcessor {
    fn import_type(&self) -> ImportType {
        ImportType::Prelevements
    }

    fn process(
        &self,
        data: &ParsedCsv,
        refs: &ReferenceData,
        config: &ImportConfig,
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();
        plan.total = data.rows.len();

        let Some(cutoff) = config.cutoff_date else {
            plan.errors.push(RowError {
                line: 0,
                row: serde_json::Value::Null,
                reason: "Date de coupure requise pour un import de prélèvements".into(),
            });
            return plan;
        };

        for row in &data.rows {
            let Some(company_id) = resolve(row, COL_COMPANY) else {
                plan.errors
                    .push(row_error(row, "Identifiant d'entreprise manquant"));
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

            // A negative log entry means the bank clawed the amount back from
            // the claim itself; the dossier total absorbs the delta and the
            // transaction keeps the magnitude.
            if montant < 0.0 {
                plan.corrections.push(AmountCorrection {
                    dossier_id: dossier.id,
                    delta: montant,
                });
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
                type_transaction: TypeTransaction::PrelevementEchoue,
                montant: montant.abs(),
                date_transaction: date,
                actif,
                batch_id: config.batch_id.clone(),
            });
        }

        plan
    }
}
