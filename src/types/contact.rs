//! Contact types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact person at a debtor company.
///
/// A contact only exists attached to a company; the import pipeline refuses
/// rows whose company cannot be resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub entreprise_id: Uuid,
    pub prenom: Option<String>,
    pub nom: Option<String>,
    pub email: String,
    pub telephone: Option<String>,
    pub mobile: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub entreprise_id: Uuid,
    pub prenom: Option<String>,
    pub nom: Option<String>,
    pub email: String,
    pub telephone: Option<String>,
    pub mobile: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_serializes_to_camel_case() {
        let c = NewContact {
            entreprise_id: Uuid::nil(),
            prenom: Some("Jean".into()),
            nom: Some("Martin".into()),
            email: "jean.martin@exemple.fr".into(),
            telephone: None,
            mobile: Some("+33612345678".into()),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["entrepriseId"], Uuid::nil().to_string());
        assert_eq!(json["email"], "jean.martin@exemple.fr");
        assert!(json["telephone"].is_null());
    }
}
