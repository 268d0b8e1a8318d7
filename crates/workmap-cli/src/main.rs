use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workmap_core::{AliasTable, RunSummary};
use workmap_sources::{GithubConfig, GithubSource, PivotalConfig, PivotalSource, Source};

#[derive(Parser)]
#[command(name = "workmap")]
#[command(about = "Workmap - aggregate who is assigned to what across trackers", long_about = None)]
#[command(version)]
struct Cli {
    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// GitHub organization to scan
    #[arg(long, env = "WORKMAP_GITHUB_ORG")]
    github_org: String,

    /// Pivotal Tracker API token; the tracker source is skipped when absent
    #[arg(long, env = "PIVOTAL_TRACKER_TOKEN", hide_env_values = true)]
    pivotal_token: Option<String>,

    /// TOML file with an [aliases] table mapping login aliases to canonical names
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Output format (json, pretty, table)
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let aliases = Arc::new(match &cli.aliases {
        Some(path) => AliasTable::from_file(path).context("loading alias table")?,
        None => AliasTable::default(),
    });

    let github = GithubSource::new(
        GithubConfig {
            token: cli.github_token.clone(),
            org: cli.github_org.clone(),
            ..GithubConfig::default()
        },
        Arc::clone(&aliases),
    )
    .context("configuring GitHub source")?;

    let mut sources: Vec<Box<dyn Source>> = vec![Box::new(github)];

    match cli.pivotal_token.as_deref() {
        Some(token) if !token.is_empty() => {
            let pivotal = PivotalSource::new(
                PivotalConfig {
                    token: token.to_string(),
                    ..PivotalConfig::default()
                },
                Arc::clone(&aliases),
            )
            .context("configuring tracker source")?;
            sources.push(Box::new(pivotal));
        }
        _ => warn!("no tracker token supplied, skipping the project tracker"),
    }

    let summary = workmap_sources::run(&sources)
        .await
        .context("aggregation run failed")?;

    match cli.output {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Pretty => print_pretty(&summary),
        OutputFormat::Table => print_table(&summary),
    }

    report_failures(&summary);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "workmap=debug,workmap_sources=debug,workmap_core=debug"
    } else {
        "workmap=info,workmap_sources=info,workmap_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(summary: &RunSummary) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(&summary.assignments).context("serializing assignments")?;
    println!("{}", rendered);
    Ok(())
}

fn print_pretty(summary: &RunSummary) {
    if summary.assignments.is_empty() {
        println!("{}", "Nobody is assigned to anything.".dimmed());
        return;
    }

    for (who, items) in &summary.assignments {
        println!(
            "{} {}",
            who.green().bold(),
            format!("({} items)", items.len()).dimmed()
        );
        for item in items {
            println!(
                "  [{}] {} {}",
                item.group.cyan(),
                item.title,
                item.url.dimmed()
            );
        }
    }
}

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Item")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
}

fn print_table(summary: &RunSummary) {
    let rows: Vec<AssignmentRow> = summary
        .assignments
        .iter()
        .flat_map(|(who, items)| {
            items.iter().map(|item| AssignmentRow {
                assignee: who.clone(),
                group: item.group.clone(),
                title: item.title.clone(),
                url: item.url.clone(),
            })
        })
        .collect();

    println!("{}", Table::new(rows));
}

fn report_failures(summary: &RunSummary) {
    for failure in &summary.failures {
        eprintln!(
            "{} {} could not be fetched: {}",
            "warning:".yellow().bold(),
            failure.scope,
            failure.error
        );
    }
}
