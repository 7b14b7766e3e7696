//! `dashpub check`: validate `publisher-config.yaml`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dashpub_core::{config, PublisherConfig};
use dashpub_sync::{Binding, BindingClass, DashboardStore, FsStore};

/// Arguments for `dashpub check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Publisher configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Tabled)]
struct BindingRow {
    #[tabled(rename = "class")]
    class: String,
    #[tabled(rename = "local folder")]
    local_folder: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "status")]
    status: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let path = config::resolve_path(self.config.as_deref());
        let config = config::load_at(&path)
            .with_context(|| format!("invalid publisher config at {}", path.display()))?;

        println!("{} {}", "✓".green().bold(), path.display());
        print_settings(&config);

        let rows = binding_rows(&config)?;
        if rows.is_empty() {
            println!("No dashboard bindings configured.");
            return Ok(());
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn print_settings(config: &PublisherConfig) {
    let or_unset = |value: &str| {
        if value.is_empty() {
            "(unset)".bright_black().to_string()
        } else {
            value.to_string()
        }
    };
    println!("  test stack:   {}", or_unset(&config.test_stack));
    println!("  custom stack: {}", or_unset(&config.custom_stack));
    println!("  exclusions:   {}", config.exclusion_set().len());
    println!(
        "  tags:         {}",
        or_unset(&config.tags.as_deref().unwrap_or_default().join(", "))
    );
    println!(
        "  root folder:  {}",
        or_unset(&config.root_folder_segments().join("/"))
    );
    println!("  uid suffix:   {}", or_unset(config.id_suffix().unwrap_or_default()));
}

fn binding_rows(config: &PublisherConfig) -> Result<Vec<BindingRow>> {
    let bindings = config
        .custom_dashboards
        .iter()
        .map(|b| Binding::new(BindingClass::Custom, b))
        .chain(
            config
                .common_dashboards
                .iter()
                .map(|b| Binding::new(BindingClass::Shared, b)),
        );

    let mut rows = Vec::new();
    for binding in bindings {
        let status = if !binding.is_configured() {
            "not configured".yellow().to_string()
        } else if FsStore
            .stat(binding.local_folder())
            .with_context(|| format!("cannot inspect {}", binding.local_folder().display()))?
            .is_none()
        {
            "local folder missing".yellow().to_string()
        } else {
            "ok".green().to_string()
        };
        rows.push(BindingRow {
            class: binding.class.to_string(),
            local_folder: binding.local_folder().display().to_string(),
            destination: binding.folders.grafana_folder,
            status,
        });
    }
    Ok(rows)
}
