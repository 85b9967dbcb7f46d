//! Recouvro Worker - CSV import pipeline for the recovery CRM
//!
//! Ingests HubSpot and bank exports, resolves them against the datastore,
//! and persists companies, contacts, dossiers and transactions.

mod cli;
mod config;
mod services;
mod store;
mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use services::detect::detect_import_type;
use services::pipeline::{ImportPipeline, ImportRun};
use services::report::error_report_csv;
use services::tokenizer::tokenize;
use store::{Datastore, JsonStore};
use types::{ConflictDecision, ImportConfig, StatusConflict};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.logs_dir, "worker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,recouvro_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer()) // stdout
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        ) // file
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Import {
            file,
            kind,
            cutoff,
            batch_id,
            report,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("lecture impossible: {}", file.display()))?;
            let import_config = ImportConfig::new(cutoff, batch_id);

            let store = Arc::new(JsonStore::open(&config.data_dir)?);
            let pipeline = ImportPipeline::new(store, config.gateway());
            let run = pipeline.run(&content, kind, &import_config).await?;

            print_summary(&run);

            if !run.conflicts.is_empty() {
                let path = config.data_dir.join("conflicts.json");
                write_json(&path, &run.conflicts)?;
                println!(
                    "{} conflit(s) en attente, décisions à fournir via `resolve {}`",
                    run.conflicts.len(),
                    path.display()
                );
            }
            if let Some(report_path) = report {
                let bytes = error_report_csv(&run.result.errors)?;
                std::fs::write(&report_path, bytes)
                    .with_context(|| format!("écriture impossible: {}", report_path.display()))?;
                info!(path = %report_path.display(), "rapport d'erreurs écrit");
            }
        }
        Command::Detect { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("lecture impossible: {}", file.display()))?;
            let parsed = tokenize(&content)?;
            match detect_import_type(&parsed.headers) {
                Some(kind) => println!("{}", kind.as_str()),
                None => println!("inconnu"),
            }
        }
        Command::Resolve {
            conflicts,
            decisions,
            batch_id,
        } => {
            let pending: Vec<StatusConflict> = read_json(&conflicts)?;
            let chosen: Vec<ConflictDecision> = read_json(&decisions)?;
            let import_config = ImportConfig::new(None, batch_id);

            let store = Arc::new(JsonStore::open(&config.data_dir)?);
            let pipeline = ImportPipeline::new(store, config.gateway());
            let run = pipeline
                .finalize_conflicts(&pending, &chosen, &import_config)
                .await?;

            print_summary(&run);
            write_json(&conflicts, &run.conflicts)?;
        }
        Command::Stats => {
            let store = JsonStore::open(&config.data_dir)?;
            println!("entreprises:  {}", store.list_entreprises().await?.len());
            println!("contacts:     {}", store.list_contacts().await?.len());
            println!("dossiers:     {}", store.list_dossiers().await?.len());
            println!("transactions: {}", store.list_transactions().await?.len());
        }
    }

    Ok(())
}

fn print_summary(run: &ImportRun) {
    let r = &run.result;
    println!("Total:        {}", r.total);
    println!("Réussis:      {}", r.success);
    println!("Erreurs:      {}", r.errors.len());
    if r.actifs + r.historiques > 0 {
        println!("Actifs:       {}", r.actifs);
        println!("Historiques:  {}", r.historiques);
    }
    if !r.a_reaffecter.is_empty() {
        println!("À réaffecter: {}", r.a_reaffecter.join(", "));
    }
    if r.conflits > 0 {
        println!("Conflits:     {}", r.conflits);
    }
    for error in &r.errors {
        println!("  ligne {}: {}", error.line, error.reason);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("lecture impossible: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("JSON invalide: {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    std::fs::write(path, raw).with_context(|| format!("écriture impossible: {}", path.display()))
}
