//! Company import processor.
//!
//! HubSpot company exports. Each row becomes a `NewEntreprise` unless the
//! record id is already known, in which case the row is counted as satisfied
//! without creating anything.

use std::collections::HashSet;

use tracing::debug;

use crate::services::columns::resolve;
use crate::services::normalize::{map_country, validate_agent};
use crate::services::tokenizer::ParsedCsv;
use crate::types::{ImportConfig, ImportPlan, ImportType, NewEntreprise};

use super::{row_error, Processor, ReferenceData};

const COL_HUBSPOT: &[&str] = &["record id", "record id - company", "hubspot id"];
const COL_NOM: &[&str] = &["company name", "nom de l'entreprise", "name"];
const COL_SIREN: &[&str] = &["siren", "siren number", "numéro siren"];
const COL_PAYS: &[&str] = &["country/region", "country", "pays"];
const COL_OWNER: &[&str] = &["company owner", "chargé de compte", "owner"];

pub struct EntreprisesProcessor;

impl Processor for EntreprisesProcessor {
    fn import_type(&self) -> ImportType {
        ImportType::Entreprises
    }

    fn process(
        &self,
        data: &ParsedCsv,
        refs: &ReferenceData,
        _config: &ImportConfig,
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();
        plan.total = data.rows.len();

        // Record ids already queued in this file, so a duplicated export row
        // does not produce two create requests.
        let mut seen: HashSet<String> = HashSet::new();

        for row in &data.rows {
            let Some(hubspot_id) = resolve(row, COL_HUBSPOT) else {
                plan.errors.push(row_error(row, "Record ID manquant"));
                continue;
            };
            let Some(nom) = resolve(row, COL_NOM) else {
                plan.errors
                    .push(row_error(row, "Nom de l'entreprise manquant"));
                continue;
            };

            if refs.entreprise(hubspot_id).is_some() || !seen.insert(hubspot_id.to_string()) {
                debug!(hubspot_id, "entreprise déjà connue, ligne ignorée");
                plan.already_present += 1;
                continue;
            }

            let charge_de_compte = match resolve(row, COL_OWNER) {
                Some(owner) => {
                    let agent = validate_agent(owner);
                    if agent.is_none() {
                        plan.to_reassign.push(nom.to_string());
                    }
                    agent
                }
                None => None,
            };

            plan.entreprises.push(NewEntreprise {
                hubspot_id: hubspot_id.to_string(),
                nom: nom.to_string(),
                siren: resolve(row, COL_SIREN).map(str::to_string),
                pays: map_country(resolve(row, COL_PAYS).unwrap_or_default()),
                charge_de_compte,
            });
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{config, entreprise, parse, refs};
    use super::*;
    use crate::types::{Agent, Pays};

    fn run(csv: &str, refs: &ReferenceData) -> ImportPlan {
        EntreprisesProcessor.process(&parse(csv), refs, &config())
    }

    #[test]
    fn creates_companies_with_mapped_fields() {
        let csv = "Record ID,Company name,SIREN,Country/Region,Company owner\n\
                   42,Dupont SARL,123456789,FR,Maya Girard\n\
                   43,Schmidt GmbH,,Germany,\n";
        let plan = run(csv, &refs(vec![], vec![]));

        assert_eq!(plan.total, 2);
        assert_eq!(plan.entreprises.len(), 2);
        assert!(plan.errors.is_empty());

        let dupont = &plan.entreprises[0];
        assert_eq!(dupont.hubspot_id, "42");
        assert_eq!(dupont.siren.as_deref(), Some("123456789"));
        assert_eq!(dupont.pays, Pays::France);
        assert_eq!(dupont.charge_de_compte, Some(Agent::Maya));

        let schmidt = &plan.entreprises[1];
        assert_eq!(schmidt.pays, Pays::Allemagne);
        assert!(schmidt.siren.is_none());
        assert!(schmidt.charge_de_compte.is_none());
        assert!(plan.to_reassign.is_empty());
    }

    #[test]
    fn missing_id_or_name_is_a_row_error() {
        let csv = "Record ID,Company name\n\
                   ,Dupont SARL\n\
                   42,(No value)\n";
        let plan = run(csv, &refs(vec![], vec![]));

        assert!(plan.entreprises.is_empty());
        assert_eq!(plan.errors.len(), 2);
        assert_eq!(plan.errors[0].reason, "Record ID manquant");
        assert_eq!(plan.errors[1].reason, "Nom de l'entreprise manquant");
    }

    #[test]
    fn known_and_duplicated_ids_are_skipped_as_present() {
        let existing = entreprise("42", "Dupont SARL");
        let csv = "Record ID,Company name\n\
                   42,Dupont SARL\n\
                   43,Martin SAS\n\
                   43,Martin SAS\n";
        let plan = run(csv, &refs(vec![existing], vec![]));

        assert_eq!(plan.entreprises.len(), 1);
        assert_eq!(plan.entreprises[0].hubspot_id, "43");
        assert_eq!(plan.already_present, 2);
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn unknown_owner_lands_in_reassign_list() {
        let csv = "Record ID,Company name,Company owner\n\
                   42,Dupont SARL,John Smith\n";
        let plan = run(csv, &refs(vec![], vec![]));

        assert_eq!(plan.entreprises.len(), 1);
        assert!(plan.entreprises[0].charge_de_compte.is_none());
        assert_eq!(plan.to_reassign, vec!["Dupont SARL".to_string()]);
    }
}
