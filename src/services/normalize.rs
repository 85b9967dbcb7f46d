//! Row value normalizers.
//!
//! Pure functions turning raw cell strings into typed domain values. These
//! are deliberately forgiving: the processors decide what counts as an
//! error, the normalizers only report "could not read".

use chrono::NaiveDate;

use crate::types::{Agent, Pays};

/// Known HubSpot owner spellings → canonical agent. Checked after the
/// canonical names themselves; lookup is lowercased and trimmed.
const AGENT_ALIASES: &[(&str, Agent)] = &[
    ("maya", Agent::Maya),
    ("maya girard", Agent::Maya),
    ("andrea", Agent::Andrea),
    ("andrea homm", Agent::Andrea),
    ("julien", Agent::Julien),
    ("julien mercier", Agent::Julien),
    ("claire", Agent::Claire),
    ("claire fontaine", Agent::Claire),
];

/// Locale-aware amount parsing. Strips currency symbols, whitespace and
/// thousands separators, converts a decimal comma to a dot. Anything
/// unreadable yields `0.0` — processors treat 0 as "missing/invalid", not
/// as a legitimate zero-amount movement.
pub fn parse_amount(raw: &str) -> f64 {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£'))
        .collect();

    if s.contains(',') && s.contains('.') {
        // The rightmost separator is the decimal one.
        if s.rfind(',') > s.rfind('.') {
            s = s.replace('.', "").replace(',', ".");
        } else {
            s = s.replace(',', "");
        }
    } else if s.contains(',') {
        if s.matches(',').count() == 1 {
            s = s.replace(',', ".");
        } else {
            // Several commas can only be thousands separators.
            s = s.replace(',', "");
        }
    }

    s.parse().unwrap_or(0.0)
}

/// Best-effort date parsing over the formats seen in HubSpot exports.
/// `None` means "missing date" — callers reject the row where a date is
/// required.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // Keep only the date part of a datetime ("2024-01-15T09:30:00Z",
    // "2024-01-15 09:30").
    let s = s.split(|c| c == 'T' || c == ' ').next().unwrap_or(s);

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%d.%m.%Y").ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%d-%m-%Y").ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%m/%d/%Y").ok())
}

/// Free-text country → canonical enum. Unmatched or empty input defaults
/// to France (documented behavior, not an error).
pub fn map_country(raw: &str) -> Pays {
    match raw.trim().to_lowercase().as_str() {
        "fr" | "fra" | "france" => Pays::France,
        "de" | "deu" | "germany" | "deutschland" | "allemagne" => Pays::Allemagne,
        other => {
            if !other.is_empty() {
                tracing::debug!("Pays non reconnu '{}', France par défaut", other);
            }
            Pays::France
        }
    }
}

/// Canonical agent names pass through unchanged; known owner spellings are
/// mapped via the alias table; anything else is `None`, meaning the company
/// needs manual reassignment — never an error.
pub fn validate_agent(raw: &str) -> Option<Agent> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(agent) = Agent::from_canonical(trimmed) {
        return Some(agent);
    }
    let normalized = trimmed.to_lowercase();
    AGENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, agent)| *agent)
}
