use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use workmap_core::{AliasTable, Assignments, BranchFailure, Result, WorkItem, WorkmapError};

use crate::fanout::fan_out;
use crate::page::{fetch_all_pages, DEFAULT_PAGE_SIZE};
use crate::source::Source;

/// Configuration for the GitHub issue-tracker source.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    pub org: String,
    pub api_base: String,
    pub page_size: usize,
    pub max_concurrent: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            org: std::env::var("WORKMAP_GITHUB_ORG").unwrap_or_default(),
            api_base: std::env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Repo {
    name: String,
    issues_url: String,
}

#[derive(Debug, Deserialize)]
struct Issue {
    title: String,
    html_url: String,
    #[serde(default)]
    assignees: Vec<Assignee>,
}

#[derive(Debug, Deserialize)]
struct Assignee {
    login: String,
}

/// Walks org -> repositories -> issues -> assignees, recording one work item
/// per (issue, assignee) pair under the assignee's canonical identity.
#[derive(Debug, Clone)]
pub struct GithubSource {
    config: GithubConfig,
    aliases: Arc<AliasTable>,
    headers: HeaderMap,
}

impl GithubSource {
    pub fn new(config: GithubConfig, aliases: Arc<AliasTable>) -> Result<Self> {
        if config.token.is_empty() {
            return Err(WorkmapError::Config(
                "GitHub token is required. Set GITHUB_TOKEN or pass --github-token.".to_string(),
            ));
        }
        if config.org.is_empty() {
            return Err(WorkmapError::Config(
                "GitHub organization is required. Set WORKMAP_GITHUB_ORG or pass --github-org."
                    .to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", config.token))
                .map_err(|e| WorkmapError::Config(format!("invalid GitHub token: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        Ok(Self {
            config,
            aliases,
            headers,
        })
    }

    async fn collect_repo(&self, client: &Client, sink: &Assignments, repo: &Repo) -> Result<()> {
        let issues_url = strip_uri_template(&repo.issues_url);
        let issues: Vec<Issue> = fetch_all_pages(
            client,
            issues_url,
            &self.headers,
            &[],
            self.config.page_size,
        )
        .await?;

        debug!("repository {} has {} issues", repo.name, issues.len());

        for issue in issues {
            for assignee in &issue.assignees {
                sink.record_as(
                    &self.aliases,
                    &assignee.login,
                    WorkItem::new(repo.name.clone(), issue.title.clone(), issue.html_url.clone()),
                );
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Source for GithubSource {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn collect(
        &self,
        client: &Client,
        sink: &Arc<Assignments>,
    ) -> Result<Vec<BranchFailure>> {
        let repos_url = format!("{}/orgs/{}/repos", self.config.api_base, self.config.org);
        let repos: Vec<Repo> = fetch_all_pages(
            client,
            &repos_url,
            &self.headers,
            &[],
            self.config.page_size,
        )
        .await?;

        info!(
            "github: organization {} has {} repositories",
            self.config.org,
            repos.len()
        );

        let outcomes = fan_out(repos, self.config.max_concurrent, |repo| {
            let fetcher = self.clone();
            let client = client.clone();
            let sink = Arc::clone(sink);
            async move {
                let scope = format!("repository {}/{}", fetcher.config.org, repo.name);
                match fetcher.collect_repo(&client, &sink, &repo).await {
                    Ok(()) => None,
                    Err(error) => {
                        warn!("{} fetch failed, skipping: {}", scope, error);
                        Some(BranchFailure::new(scope, error))
                    }
                }
            }
        })
        .await?;

        Ok(outcomes.into_iter().flatten().collect())
    }
}

/// GitHub hands back RFC 6570-style templates (`.../issues{/number}`); the
/// collection endpoint is everything before the placeholder.
fn strip_uri_template(url: &str) -> &str {
    url.find('{').map_or(url, |idx| &url[..idx])
}
