//! `dashpub stacks`: show the stacks a run would target. Read-only.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use dashpub_client::{CloudApi, CloudClient};
use dashpub_core::{config, Stack};
use dashpub_sync::{selector, PublishMode};

/// Arguments for `dashpub stacks`.
#[derive(Args, Debug)]
pub struct StacksArgs {
    /// Show all-stacks targets instead of the test stack only.
    #[arg(long)]
    pub all: bool,

    /// Publisher configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Look up a single stack by slug instead of listing every stack.
    #[arg(long, value_name = "SLUG")]
    pub slug: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct StackRow {
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "url")]
    url: String,
    #[tabled(rename = "excluded")]
    excluded: bool,
    #[tabled(rename = "shared")]
    shared: bool,
    #[tabled(rename = "custom")]
    custom: bool,
}

impl StacksArgs {
    pub fn run(self) -> Result<()> {
        let config = config::load(self.config.as_deref()).context("failed to load publisher config")?;
        let client = CloudClient::from_env().context("stack listing needs an account credential")?;
        let exclusions = config.exclusion_set();

        if let Some(slug) = self.slug.as_deref() {
            let stack = client
                .get_stack(slug)
                .with_context(|| format!("failed to look up stack {slug}"))?;
            return print_stack(&stack, exclusions.contains(&stack.slug), self.json);
        }

        let stacks = client.list_stacks().context("failed to list stacks")?;
        let mode = PublishMode::from_all_flag(self.all);
        let targets = selector::select(
            stacks.clone(),
            &exclusions,
            mode,
            &config.test_stack,
            &config.custom_stack,
        );

        let rows: Vec<StackRow> = stacks
            .iter()
            .map(|stack| StackRow {
                slug: stack.slug.to_string(),
                id: stack.id,
                url: stack.url.clone(),
                excluded: exclusions.contains(&stack.slug),
                shared: targets.shared.contains(stack),
                custom: targets.custom.contains(stack),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize stacks JSON")?
            );
            return Ok(());
        }

        println!("{} stacks ({:?})", rows.len(), mode);
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        for (label, targets) in [("custom", &targets.custom), ("shared", &targets.shared)] {
            if let Err(err) = targets.stacks() {
                println!("{} {label} dashboards: {err}", "!".red().bold());
            }
        }
        Ok(())
    }
}

fn print_stack(stack: &Stack, excluded: bool, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(stack).context("failed to serialize stack JSON")?;
        value["excluded"] = serde_json::Value::Bool(excluded);
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to serialize stack JSON")?
        );
        return Ok(());
    }

    let or_dash = |id: Option<u64>| id.map_or_else(|| "-".to_string(), |id| id.to_string());
    println!("{}", stack.slug.to_string().bold());
    println!("  id:               {}", stack.id);
    println!("  url:              {}", stack.url);
    println!("  logs instance:    {}", or_dash(stack.logs_instance_id));
    println!("  metrics instance: {}", or_dash(stack.metrics_instance_id));
    if excluded {
        println!("  {}", "excluded from publishing".yellow());
    }
    Ok(())
}
