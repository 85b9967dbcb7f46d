//! Import-type detection from the header shape.
//!
//! Each known export carries a signature header pair. The rules are checked
//! in a fixed priority order — ambiguous files (e.g. carrying both
//! `company id` and `deal stage`) must hit the more specific earlier rule,
//! so do not reorder this list.

use crate::types::ImportType;

/// Returns the detected type, or `None` when no signature matches (the
/// operator must then pick a type manually).
pub fn detect_import_type(headers: &[String]) -> Option<ImportType> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let has = |name: &str| normalized.iter().any(|h| h == name);
    let has_containing = |needle: &str| normalized.iter().any(|h| h.contains(needle));

    if has("record id") && has("company name") {
        return Some(ImportType::Entreprises);
    }
    if has("company id") && has("email") {
        return Some(ImportType::Contacts);
    }
    if has("log_date") && has("failure code") {
        return Some(ImportType::Prelevements);
    }
    if has("category") && has_containing("hubspot") {
        return Some(ImportType::Virements);
    }
    if has("deal stage") || has("provider_v2") {
        return Some(ImportType::Creances);
    }
    None
}
