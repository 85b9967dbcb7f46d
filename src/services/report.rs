//! Downloadable error report.
//!
//! Renders collected row errors as a two-column CSV (`Ligne,Erreur`). The
//! output is BOM-prefixed so Excel opens the accented French text correctly.

use anyhow::Result;

use crate::types::RowError;

pub fn error_report_csv(errors: &[RowError]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Ligne", "Erreur"])?;
    for error in errors {
        writer.write_record([error.row.to_string(), error.reason.clone()])?;
    }
    let body = writer.into_inner()?;

    let mut out = "\u{feff}".as_bytes().to_vec();
    out.extend_from_slice(&body);
    Ok(out)
}
