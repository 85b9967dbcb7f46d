//! Contact import processor.
//!
//! Contact exports reference their company by HubSpot id; a row whose
//! company is unknown, or that has no email, is an error — contacts never
//! exist unattached.

use crate::services::columns::resolve;
use crate::services::tokenizer::ParsedCsv;
use crate::types::{ImportConfig, ImportPlan, ImportType, NewContact};

use super::{row_error, Processor, ReferenceData};

const COL_COMPANY: &[&str] = &[
    "company id",
    "associated company id",
    "record id - company",
    "company record id",
];
const COL_EMAIL: &[&str] = &["email", "e-mail", "adresse email"];
const COL_PRENOM: &[&str] = &["first name", "prénom", "prenom"];
const COL_NOM: &[&str] = &["last name", "nom", "nom de famille"];
const COL_TELEPHONE: &[&str] = &["phone number", "téléphone", "phone"];
const COL_MOBILE: &[&str] = &["mobile phone number", "mobile", "portable"];

pub struct ContactsProcessor;

impl Processor for ContactsProcessor {
    fn import_type(&self) -> ImportType {
        ImportType::Contacts
    }

    fn process(
        &self,
        data: &ParsedCsv,
        refs: &ReferenceData,
        _config: &ImportConfig,
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();
        plan.total = data.rows.len();

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
            let Some(email) = resolve(row, COL_EMAIL) else {
                plan.errors.push(row_error(row, "Email manquant"));
                continue;
            };

            plan.contacts.push(NewContact {
                entreprise_id: entreprise.id,
                prenom: resolve(row, COL_PRENOM).map(str::to_string),
                nom: resolve(row, COL_NOM).map(str::to_string),
                email: email.to_string(),
                telephone: resolve(row, COL_TELEPHONE).map(str::to_string),
                mobile: resolve(row, COL_MOBILE).map(str::to_string),
            });
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{config, entreprise, parse, refs};
    use super::*;

    #[test]
    fn attaches_contacts_to_resolved_company() {
        let dupont = entreprise("42", "Dupont SARL");
        let dupont_id = dupont.id;
        let csv = "Company ID,First Name,Last Name,Email,Mobile Phone Number\n\
                   42,Jean,Martin,jean.martin@exemple.fr,+33612345678\n";
        let plan = ContactsProcessor.process(&parse(csv), &refs(vec![dupont], vec![]), &config());

        assert_eq!(plan.contacts.len(), 1);
        let c = &plan.contacts[0];
        assert_eq!(c.entreprise_id, dupont_id);
        assert_eq!(c.email, "jean.martin@exemple.fr");
        assert_eq!(c.prenom.as_deref(), Some("Jean"));
        assert_eq!(c.mobile.as_deref(), Some("+33612345678"));
        assert!(c.telephone.is_none());
    }

    #[test]
    fn unknown_company_and_missing_email_are_errors() {
        let dupont = entreprise("42", "Dupont SARL");
        let csv = "Company ID,Email\n\
                   99,jean@exemple.fr\n\
                   42,(No value)\n\
                   ,jean@exemple.fr\n";
        let plan = ContactsProcessor.process(&parse(csv), &refs(vec![dupont], vec![]), &config());

        assert!(plan.contacts.is_empty());
        assert_eq!(plan.errors.len(), 3);
        assert_eq!(plan.errors[0].reason, "Entreprise inconnue: 99");
        assert_eq!(plan.errors[1].reason, "Email manquant");
        assert_eq!(plan.errors[2].reason, "Identifiant d'entreprise manquant");
    }
}
