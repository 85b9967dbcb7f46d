//! Debtor company types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country of incorporation — the platform currently operates in two markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pays {
    France,
    Allemagne,
}

impl Pays {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pays::France => "France",
            Pays::Allemagne => "Allemagne",
        }
    }
}

impl Default for Pays {
    fn default() -> Self {
        Pays::France
    }
}

/// Recovery agent in charge of a company's cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agent {
    Maya,
    Andrea,
    Julien,
    Claire,
}

impl Agent {
    pub const ALL: [Agent; 4] = [Agent::Maya, Agent::Andrea, Agent::Julien, Agent::Claire];

    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::Maya => "Maya",
            Agent::Andrea => "Andrea",
            Agent::Julien => "Julien",
            Agent::Claire => "Claire",
        }
    }

    /// Exact canonical-name lookup (case-sensitive, as stored in HubSpot).
    pub fn from_canonical(s: &str) -> Option<Agent> {
        Agent::ALL.iter().copied().find(|a| a.as_str() == s)
    }
}

/// Debtor company entity (EntrepriseDebiteur).
///
/// `hubspot_id` uniquely identifies a company across imports — a repeated
/// import must resolve to the existing record, never duplicate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entreprise {
    pub id: Uuid,
    pub hubspot_id: String,
    pub nom: String,
    pub siren: Option<String>,
    pub pays: Pays,
    pub charge_de_compte: Option<Agent>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a debtor company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntreprise {
    pub hubspot_id: String,
    pub nom: String,
    pub siren: Option<String>,
    pub pays: Pays,
    pub charge_de_compte: Option<Agent>,
}
