//! Claims (deal) import processor.
//!
//! HubSpot deal exports carry one claim per row, several rows per company.
//! Rows are grouped by company in first-seen order and merged into a single
//! dossier whose amount is the sum of the claim amounts. Amounts are read
//! exclusively from the `sum to recover` column family; deal exports also
//! carry an `Amount` column holding unrelated pipeline values, which must
//! never be used.
//!
//! When a company's rows disagree on the raw deal stage, no dossier is
//! created: the company is emitted as a [`StatusConflict`] for the operator
//! to settle.

use std::collections::HashMap;

use chrono::Utc;

use crate::services::columns::resolve;
use crate::services::normalize::parse_amount;
use crate::services::status::map_deal_stage;
use crate::services::tokenizer::ParsedCsv;
use crate::types::{
    Apporteur, ConflictClaim, ConflictState, ImportConfig, ImportPlan, ImportType, NewDossier,
    StatusConflict,
};

use super::{row_error, Processor, ReferenceData};

const COL_COMPANY: &[&str] = &[
    "record id - company",
    "associated company id",
    "company id",
];
const COL_STAGE: &[&str] = &["deal stage", "dealstage", "statut"];
const COL_PROVIDER: &[&str] = &["provider_v2", "provider"];
// Never "amount": that column exists in deal exports but holds a different
// pipeline figure.
const COL_MONTANT: &[&str] = &[
    "sum to recover",
    "sum to recover (company)",
    "total sum to recover",
];

struct CompanyClaims {
    entreprise_id: uuid::Uuid,
    claims: Vec<ConflictClaim>,
}

pub struct CreancesProcessor;

impl Processor for CreancesProcessor {
    fn import_type(&self) -> ImportType {
        ImportType::Creances
    }

    fn process(
        &self,
        data: &ParsedCsv,
        refs: &ReferenceData,
        config: &ImportConfig,
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();
        plan.total = data.rows.len();

        // Group claims per company, keeping the order companies first appear
        // so dossier creation stays stable across runs of the same file.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, CompanyClaims> = HashMap::new();

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

            let montant = parse_amount(resolve(row, COL_MONTANT).unwrap_or_default());
            if montant == 0.0 {
                plan.errors
                    .push(row_error(row, "Somme à recouvrer invalide ou nulle"));
                continue;
            }

            let statut_brut = resolve(row, COL_STAGE).unwrap_or_default().to_string();
            let apporteur = resolve(row, COL_PROVIDER)
                .map(Apporteur::from_raw)
                .unwrap_or(Apporteur::Autre);

            let key = company_id.to_string();
            let group = groups.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                CompanyClaims {
                    entreprise_id: entreprise.id,
                    claims: Vec::new(),
                }
            });
            group.claims.push(ConflictClaim {
                montant,
                statut_brut,
                apporteur,
            });
        }

        for hubspot_id in order {
            let Some(group) = groups.remove(&hubspot_id) else {
                continue;
            };
            let total: f64 = group.claims.iter().map(|c| c.montant).sum();

            // Distinct raw statuses, compared case-insensitively, keeping the
            // first-seen spelling for display.
            let mut statuses: Vec<String> = Vec::new();
            for claim in &group.claims {
                let brut = claim.statut_brut.trim();
                if !statuses.iter().any(|s| s.eq_ignore_ascii_case(brut)) {
                    statuses.push(brut.to_string());
                }
            }

            if statuses.len() > 1 {
                plan.conflicts.push(StatusConflict {
                    hubspot_id,
                    entreprise_id: group.entreprise_id,
                    claims: group.claims,
                    statuses,
                    total,
                    state: ConflictState::Detected,
                });
                continue;
            }

            let Some(first) = group.claims.first() else {
                continue;
            };
            plan.dossiers.push(NewDossier {
                entreprise_id: group.entreprise_id,
                hubspot_id,
                montant_initial: total,
                apporteur: first.apporteur,
                statut: map_deal_stage(&first.statut_brut),
                statut_depuis: Utc::now().date_naive(),
                notes: None,
                batch_id: config.batch_id.clone(),
            });
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{config, entreprise, parse, refs};
    use super::*;
    use crate::types::StatutRecouvrement;

    #[test]
    fn merges_claim_rows_into_one_dossier() {
        let e = entreprise("42", "Dupont SARL");
        let e_id = e.id;
        let csv = "Record ID - Company,Deal Stage,provider_v2,Sum to recover\n\
                   42,R1,defacto,\"1 200,50\"\n\
                   42,R1,defacto,300.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert_eq!(plan.dossiers.len(), 1);
        let d = &plan.dossiers[0];
        assert_eq!(d.entreprise_id, e_id);
        assert_eq!(d.hubspot_id, "42");
        assert_eq!(d.montant_initial, 1500.5);
        assert_eq!(d.statut, StatutRecouvrement::RelanceUn);
        assert_eq!(d.apporteur, Apporteur::Defacto);
        assert!(plan.conflicts.is_empty());
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn amount_is_never_read_from_the_amount_column() {
        let e = entreprise("42", "Dupont SARL");
        let csv = "Record ID - Company,Deal Stage,Amount,Sum to recover\n\
                   42,R1,99999.00,100.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert_eq!(plan.dossiers[0].montant_initial, 100.0);
    }

    #[test]
    fn disagreeing_statuses_become_a_conflict_without_dossier() {
        let e = entreprise("42", "Dupont SARL");
        let csv = "Record ID - Company,Deal Stage,Sum to recover\n\
                   42,R1,100.00\n\
                   42,R2,50.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert!(plan.dossiers.is_empty());
        assert_eq!(plan.conflicts.len(), 1);
        let c = &plan.conflicts[0];
        assert_eq!(c.hubspot_id, "42");
        assert_eq!(c.statuses, vec!["R1".to_string(), "R2".to_string()]);
        assert_eq!(c.total, 150.0);
        assert_eq!(c.claims.len(), 2);
        assert_eq!(c.state, ConflictState::Detected);
    }

    #[test]
    fn same_status_spelled_differently_is_not_a_conflict() {
        let e = entreprise("42", "Dupont SARL");
        let csv = "Record ID - Company,Deal Stage,Sum to recover\n\
                   42,Mise en demeure,100.00\n\
                   42,MISE EN DEMEURE,50.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert!(plan.conflicts.is_empty());
        assert_eq!(plan.dossiers.len(), 1);
        assert_eq!(plan.dossiers[0].statut, StatutRecouvrement::MiseEnDemeure);
        assert_eq!(plan.dossiers[0].montant_initial, 150.0);
    }

    #[test]
    fn invalid_amount_rows_are_dropped_from_the_sum() {
        let e = entreprise("42", "Dupont SARL");
        let csv = "Record ID - Company,Deal Stage,Sum to recover\n\
                   42,R1,100.00\n\
                   42,R1,(No value)\n\
                   42,R1,50.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert_eq!(plan.errors.len(), 1);
        assert_eq!(plan.errors[0].reason, "Somme à recouvrer invalide ou nulle");
        assert_eq!(plan.dossiers[0].montant_initial, 150.0);
    }

    #[test]
    fn unknown_stage_defaults_to_pending_assignation() {
        let e = entreprise("42", "Dupont SARL");
        let csv = "Record ID - Company,Deal Stage,Sum to recover\n\
                   42,étape exotique,100.00\n";
        let plan = CreancesProcessor.process(&parse(csv), &refs(vec![e], vec![]), &config());

        assert_eq!(
            plan.dossiers[0].statut,
            StatutRecouvrement::PendingAssignation
        );
    }

    #[test]
    fn companies_keep_first_seen_order() {
        let a = entreprise("1", "Alpha");
        let b = entreprise("2", "Beta");
        let csv = "Record ID - Company,Deal Stage,Sum to recover\n\
                   2,R1,10.00\n\
                   1,R1,20.00\n\
                   2,R1,30.00\n";
        let plan =
            CreancesProcessor.process(&parse(csv), &refs(vec![a, b], vec![]), &config());

        assert_eq!(plan.dossiers.len(), 2);
        assert_eq!(plan.dossiers[0].hubspot_id, "2");
        assert_eq!(plan.dossiers[0].montant_initial, 40.0);
        assert_eq!(plan.dossiers[1].hubspot_id, "1");
    }
}
