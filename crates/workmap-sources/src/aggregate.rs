use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use tracing::{error, info};
use workmap_core::{Assignments, Result, RunSummary, WorkmapError};

use crate::source::Source;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("workmap/", env!("CARGO_PKG_VERSION"));

/// The shared transport for one run: a single pooled client every branch of
/// every source reuses.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WorkmapError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Run every source's full traversal concurrently and return the finished
/// mapping once all of them (and all their nested fan-out) have joined.
pub async fn run(sources: &[Box<dyn Source>]) -> Result<RunSummary> {
    let client = build_client()?;
    run_with_client(sources, client).await
}

/// As `run`, with a caller-supplied client. The client is dropped on every
/// exit path once the traversals have joined, releasing the pool with it.
pub async fn run_with_client(sources: &[Box<dyn Source>], client: Client) -> Result<RunSummary> {
    let sink = Arc::new(Assignments::new());

    let traversals = sources.iter().map(|source| {
        let client = &client;
        let sink = &sink;
        async move { (source.name(), source.collect(client, sink).await) }
    });
    let outcomes = join_all(traversals).await;

    let mut failures = Vec::new();
    let mut fatal = None;
    for (name, outcome) in outcomes {
        match outcome {
            Ok(branch_failures) => {
                if !branch_failures.is_empty() {
                    info!(
                        "source {} finished with {} failed branches",
                        name,
                        branch_failures.len()
                    );
                }
                failures.extend(branch_failures);
            }
            Err(err) => {
                error!("source {} failed at its root fetch: {}", name, err);
                if fatal.is_none() {
                    fatal = Some(err);
                }
            }
        }
    }

    // A failed root fetch is fatal for the whole run; isolated branch
    // failures travel with the summary instead.
    if let Some(err) = fatal {
        return Err(err);
    }

    let sink = Arc::try_unwrap(sink).map_err(|_| {
        WorkmapError::Join("accumulator still shared after all traversals joined".to_string())
    })?;

    let summary = RunSummary {
        assignments: sink.into_sorted(),
        failures,
    };
    info!(
        "aggregated {} work items across {} identities",
        summary.item_count(),
        summary.assignments.len()
    );
    Ok(summary)
}
