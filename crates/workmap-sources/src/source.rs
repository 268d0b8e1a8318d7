use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use workmap_core::{Assignments, BranchFailure, Result};

/// One upstream tracker the aggregator can traverse.
///
/// `collect` walks the source's whole fetch tree against the shared client
/// and writes every resolved assignment into `sink`. An `Err` means the
/// root fetch itself failed and nothing from this source was traversed;
/// `Ok(failures)` means the traversal completed with zero or more isolated
/// branch failures.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;

    async fn collect(&self, client: &Client, sink: &Arc<Assignments>)
        -> Result<Vec<BranchFailure>>;
}
