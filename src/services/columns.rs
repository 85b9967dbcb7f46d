//! Column resolution.
//!
//! HubSpot export headers change casing and spelling between export
//! versions; every processor looks fields up through this single seam with
//! an ordered candidate list (most-specific alias first).

use super::tokenizer::RawRow;

/// HubSpot's placeholder for an empty cell.
const NO_VALUE: &str = "(No value)";

/// Returns the first non-empty value among `candidates`, matching keys
/// case-insensitively after trimming. `"(No value)"` counts as empty.
pub fn resolve<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a str> {
    for candidate in candidates {
        let candidate = candidate.trim();
        for (key, value) in &row.fields {
            if key.trim().eq_ignore_ascii_case(candidate) {
                let value = value.trim();
                if !value.is_empty() && value != NO_VALUE {
                    return Some(value);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> RawRow {
        RawRow {
            line: 2,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn finds_value_despite_casing_and_whitespace() {
        let r = row(&[(" AMOUNT ", "1 234,56")]);
        assert_eq!(resolve(&r, &["amount", "Amount", "montant"]), Some("1 234,56"));
    }

    #[test]
    fn candidate_priority_order_is_respected() {
        let r = row(&[("montant", "50"), ("amount", "100")]);
        assert_eq!(resolve(&r, &["amount", "montant"]), Some("100"));
        assert_eq!(resolve(&r, &["montant", "amount"]), Some("50"));
    }

    #[test]
    fn empty_and_no_value_cells_are_skipped() {
        let r = row(&[("amount", "  "), ("montant", "(No value)"), ("total", "42")]);
        assert_eq!(resolve(&r, &["amount", "montant", "total"]), Some("42"));
    }

    #[test]
    fn unmatched_candidates_yield_none() {
        let r = row(&[("amount", "100")]);
        assert_eq!(resolve(&r, &["sum to recover", "somme"]), None);
    }
}
