//! CSV tokenizer.
//!
//! Turns raw file text into a header row plus ordered row-objects. HubSpot
//! exports arrive with either `,` or `;` as delimiter and inconsistent
//! quoting, so the delimiter is auto-detected from the first line and a
//! wrong guess (single header containing `;`) triggers a forced `;` retry.
//! Lines whose field count does not match the header are recorded as parse
//! errors and skipped — the rest of the file still parses.

use anyhow::{bail, Result};
use serde_json::{json, Value};

use crate::types::RowError;

/// One parsed data row: original header → raw cell value, in column order,
/// plus the 1-based source line number (header is line 1).
#[derive(Debug, Clone)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    /// Case-insensitive, trimmed lookup of a single header key.
    pub fn get_ci(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.fields
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// JSON object rendering, for error reports.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (k, v) in &self.fields {
            map.insert(k.clone(), json!(v));
        }
        Value::Object(map)
    }
}

/// Tokenized file: headers, rows, the delimiter that was used, and the
/// per-line parse errors encountered along the way.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub delimiter: char,
    pub rows: Vec<RawRow>,
    pub errors: Vec<RowError>,
}

/// Pick the delimiter by counting occurrences on the first line; tie → `,`.
pub fn detect_delimiter(first_line: &str) -> char {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Tokenize a whole CSV file. An empty or headerless file is a top-level
/// error; individual bad lines are collected in `ParsedCsv::errors`.
pub fn tokenize(content: &str) -> Result<ParsedCsv> {
    let content = content.trim_start_matches('\u{feff}');
    let first_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    if first_line.is_empty() {
        bail!("Fichier CSV vide");
    }

    let delimiter = detect_delimiter(first_line);
    let parsed = tokenize_with(content, delimiter)?;

    // A single header field still containing `;` means the guess was wrong
    // (typically a file whose lines are each wrapped in one quote pair).
    // Re-run forcing `;`, with quoting off so the wrapper does not glue the
    // line back into one field.
    if parsed.headers.len() == 1 && parsed.headers[0].contains(';') {
        return tokenize_forced_semicolon(content);
    }
    Ok(parsed)
}

/// One level of surrounding quotes, as the forced pass splits inside them.
fn strip_outer_quotes(s: &str) -> &str {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    s.strip_suffix('"').unwrap_or(s)
}

fn tokenize_forced_semicolon(content: &str) -> Result<ParsedCsv> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .quoting(false)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| strip_outer_quotes(h).to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("Fichier CSV vide ou illisible");
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let fallback_line = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(RowError {
                    line: fallback_line,
                    row: Value::Null,
                    reason: format!("Ligne illisible: {e}"),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if record.len() != headers.len() {
            errors.push(RowError {
                line,
                row: json!(record.iter().collect::<Vec<_>>()),
                reason: format!(
                    "Nombre de colonnes inattendu: {} au lieu de {}",
                    record.len(),
                    headers.len()
                ),
            });
            continue;
        }
        rows.push(RawRow {
            line,
            fields: headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| strip_outer_quotes(v).to_string()))
                .collect(),
        });
    }

    Ok(ParsedCsv { headers, delimiter: ';', rows, errors })
}

fn tokenize_with(content: &str, delimiter: char) -> Result<ParsedCsv> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("Fichier CSV vide ou illisible");
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let fallback_line = idx + 2;
        match record {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                // The csv reader skips fully empty lines; a lone empty field
                // is what a whitespace-only line parses to.
                if record.len() == 1 && record[0].is_empty() {
                    continue;
                }
                if record.len() != headers.len() {
                    errors.push(RowError {
                        line,
                        row: json!(record.iter().collect::<Vec<_>>()),
                        reason: format!(
                            "Nombre de colonnes inattendu: {} au lieu de {}",
                            record.len(),
                            headers.len()
                        ),
                    });
                    continue;
                }
                rows.push(RawRow {
                    line,
                    fields: headers
                        .iter()
                        .cloned()
                        .zip(record.iter().map(|v| v.to_string()))
                        .collect(),
                });
            }
            Err(e) => errors.push(RowError {
                line: fallback_line,
                row: Value::Null,
                reason: format!("Ligne illisible: {e}"),
            }),
        }
    }

    Ok(ParsedCsv { headers, delimiter, rows, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_when_more_frequent() {
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a,b,c"), ',');
        assert_eq!(detect_delimiter("a;b,c,d"), ',');
    }

    #[test]
    fn tie_prefers_comma() {
        assert_eq!(detect_delimiter("a;b,c"), ',');
    }

    #[test]
    fn parses_simple_file() {
        let parsed = tokenize("nom,montant\nDupont,100\nDurand,200\n").unwrap();
        assert_eq!(parsed.delimiter, ',');
        assert_eq!(parsed.headers, vec!["nom", "montant"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].get_ci("NOM"), Some("Dupont"));
        assert_eq!(parsed.rows[1].line, 3);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn quoted_field_keeps_embedded_delimiter_and_unescapes_quotes() {
        let content = "nom;commentaire\nDupont;\"He said \"\"hi\"\", x;y\"\n";
        let parsed = tokenize(content).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(
            parsed.rows[0].get_ci("commentaire"),
            Some("He said \"hi\", x;y")
        );
    }

    #[test]
    fn column_count_mismatch_is_recorded_not_fatal() {
        let content = "a,b,c\n1,2,3\n1,2\n4,5,6\n";
        let parsed = tokenize(content).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 3);
        assert!(parsed.errors[0].reason.contains("colonnes"));
    }

    #[test]
    fn blank_lines_are_skipped_entirely() {
        let content = "a,b\n1,2\n\n3,4\n";
        let parsed = tokenize(content).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn single_column_header_with_semicolons_falls_back() {
        // Every line wrapped in one quote pair: the first pass sees a single
        // quoted header field with embedded `;` and must re-parse forcing `;`.
        let content = "\"record id;company name;siren\"\n\"1;Dupont;123456789\"\n";
        let parsed = tokenize(content).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.headers.len(), 3);
        assert_eq!(parsed.rows[0].get_ci("company name"), Some("Dupont"));
        assert_eq!(parsed.rows[0].get_ci("siren"), Some("123456789"));
    }

    #[test]
    fn empty_file_is_a_top_level_error() {
        assert!(tokenize("").is_err());
        assert!(tokenize("\n\n").is_err());
    }

    #[test]
    fn bom_is_stripped_before_parsing() {
        let parsed = tokenize("\u{feff}nom,montant\nDupont,10\n").unwrap();
        assert_eq!(parsed.headers[0], "nom");
    }

    #[test]
    fn row_to_json_keeps_all_fields() {
        let parsed = tokenize("a,b\n1,2\n").unwrap();
        let json = parsed.rows[0].to_json();
        assert_eq!(json["a"], "1");
        assert_eq!(json["b"], "2");
    }
}
