//! CLI argument parsing for the recouvro-worker binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::types::ImportType;

#[derive(Parser)]
#[command(name = "recouvro-worker", about = "Recouvro import worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a CSV export into the datastore
    Import {
        /// Path to the CSV file
        file: PathBuf,
        /// Force the import type instead of detecting it from the headers
        #[arg(long, value_enum)]
        kind: Option<ImportType>,
        /// Cutoff date (YYYY-MM-DD); transactions before it are inactive
        #[arg(long)]
        cutoff: Option<NaiveDate>,
        /// Batch id stamped on created records (generated when omitted)
        #[arg(long)]
        batch_id: Option<String>,
        /// Write the error report CSV to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Detect the import type of a CSV file and exit
    Detect {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Resolve pending status conflicts with operator decisions
    Resolve {
        /// Conflicts JSON written by a previous import
        conflicts: PathBuf,
        /// Decisions JSON (array of {hubspotId, statut, montant})
        decisions: PathBuf,
        /// Batch id stamped on created dossiers (generated when omitted)
        #[arg(long)]
        batch_id: Option<String>,
    },
    /// Print datastore record counts
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_import_parses_options() {
        let cli = Cli::parse_from([
            "recouvro-worker",
            "import",
            "export.csv",
            "--kind",
            "virements",
            "--cutoff",
            "2024-01-01",
            "--batch-id",
            "IMPORT_X",
        ]);
        match cli.command {
            Command::Import { file, kind, cutoff, batch_id, report } => {
                assert_eq!(file, PathBuf::from("export.csv"));
                assert_eq!(kind, Some(ImportType::Virements));
                assert_eq!(cutoff, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(batch_id.as_deref(), Some("IMPORT_X"));
                assert!(report.is_none());
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_import_defaults_to_detection() {
        let cli = Cli::parse_from(["recouvro-worker", "import", "export.csv"]);
        match cli.command {
            Command::Import { kind, cutoff, .. } => {
                assert!(kind.is_none());
                assert!(cutoff.is_none());
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_resolve_command_parses() {
        let cli = Cli::parse_from([
            "recouvro-worker",
            "resolve",
            "conflicts.json",
            "decisions.json",
        ]);
        assert!(matches!(cli.command, Command::Resolve { .. }));
    }

    #[test]
    fn test_cli_invalid_cutoff_is_rejected() {
        let res = Cli::try_parse_from([
            "recouvro-worker",
            "import",
            "export.csv",
            "--cutoff",
            "pas-une-date",
        ]);
        assert!(res.is_err());
    }
}
