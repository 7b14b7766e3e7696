//! `dashpub publish`: run the reconciliation engine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dashpub_client::CLOUD_TOKEN_ENV;
use dashpub_sync::{BindingReport, BindingStatus, PublishMode, PublishReport, Publisher};

/// Arguments for `dashpub publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Publish to every non-excluded stack instead of the test stack only.
    #[arg(long)]
    pub all: bool,

    /// Publisher configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl PublishArgs {
    pub fn run(self) -> Result<()> {
        let publisher =
            Publisher::load(self.config.as_deref()).context("failed to load publisher config")?;
        let mode = PublishMode::from_all_flag(self.all);
        let report = publisher.publish(mode).context("publish failed")?;

        match &report {
            PublishReport::Skipped => {
                eprintln!("{CLOUD_TOKEN_ENV} not set, nothing was published");
            }
            PublishReport::Completed { bindings, .. } => print_report(&report, bindings),
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "class")]
    class: String,
    #[tabled(rename = "local folder")]
    local_folder: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "stack")]
    stack: String,
    #[tabled(rename = "attempts")]
    attempts: String,
    #[tabled(rename = "uploaded")]
    uploaded: String,
    #[tabled(rename = "deleted")]
    deleted: String,
}

fn rows(binding: &BindingReport) -> Vec<OutcomeRow> {
    let row = |stack: String, attempts: String, uploaded: String, deleted: String| OutcomeRow {
        class: binding.class.to_string(),
        local_folder: binding.local_folder.display().to_string(),
        destination: binding.grafana_folder.clone(),
        stack,
        attempts,
        uploaded,
        deleted,
    };
    let skipped = |reason: &str| row(reason.to_string(), "-".into(), "-".into(), "-".into());

    match &binding.status {
        BindingStatus::NotConfigured => vec![skipped("not configured")],
        BindingStatus::LocalFolderMissing => vec![skipped("local folder missing")],
        BindingStatus::Synced(outcomes) => outcomes
            .iter()
            .map(|o| {
                let attempts = if o.retried() {
                    o.attempts.to_string().yellow().to_string()
                } else {
                    o.attempts.to_string()
                };
                let deleted = if o.report.already_absent > 0 {
                    format!("{} ({} absent)", o.report.deleted, o.report.already_absent)
                } else {
                    o.report.deleted.to_string()
                };
                row(
                    o.slug.to_string(),
                    attempts,
                    o.report.uploaded.to_string(),
                    deleted,
                )
            })
            .collect(),
    }
}

fn print_report(report: &PublishReport, bindings: &[BindingReport]) {
    if bindings.is_empty() {
        println!("No dashboard bindings configured.");
        return;
    }

    let table_rows: Vec<OutcomeRow> = bindings.iter().flat_map(rows).collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} {} uploaded, {} deleted",
        "✓".green().bold(),
        report.uploaded(),
        report.deleted()
    );
}
