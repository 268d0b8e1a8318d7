use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use workmap_core::{AliasTable, Assignments, BranchFailure, Result, WorkItem, WorkmapError};

use crate::fanout::fan_out;
use crate::page::get_json;
use crate::source::Source;

/// Public story page, distinct from the API base.
const STORY_SHOW_URL: &str = "https://www.pivotaltracker.com/story/show";

/// Accepted stories are done; nobody is "assigned" to them anymore.
const ACTIVE_STORY_FILTER: &str = "-state:accepted";

const TRACKER_TOKEN_HEADER: &str = "X-TrackerToken";

/// Configuration for the Pivotal-style project-tracker source.
#[derive(Debug, Clone)]
pub struct PivotalConfig {
    pub token: String,
    pub api_base: String,
    /// Upper bound on stories requested per project; the service caps this
    /// on its side, so one request per project suffices.
    pub story_limit: usize,
    pub max_concurrent: usize,
}

impl Default for PivotalConfig {
    fn default() -> Self {
        Self {
            token: std::env::var("PIVOTAL_TRACKER_TOKEN").unwrap_or_default(),
            api_base: std::env::var("PIVOTAL_API_BASE")
                .unwrap_or_else(|_| "https://www.pivotaltracker.com/services/v5".to_string()),
            story_limit: 500,
            max_concurrent: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Project {
    id: u64,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Story {
    id: u64,
    project_id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Owner {
    username: String,
}

/// Walks projects -> stories -> owners, recording one work item per
/// (story, owner) pair. Stories already accepted are filtered out by the
/// stories query itself, so their owners are never fetched.
#[derive(Debug, Clone)]
pub struct PivotalSource {
    config: PivotalConfig,
    aliases: Arc<AliasTable>,
    headers: HeaderMap,
}

impl PivotalSource {
    pub fn new(config: PivotalConfig, aliases: Arc<AliasTable>) -> Result<Self> {
        if config.token.is_empty() {
            return Err(WorkmapError::Config(
                "Tracker token is required. Set PIVOTAL_TRACKER_TOKEN or pass --pivotal-token."
                    .to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            TRACKER_TOKEN_HEADER,
            HeaderValue::from_str(&config.token)
                .map_err(|e| WorkmapError::Config(format!("invalid tracker token: {}", e)))?,
        );

        Ok(Self {
            config,
            aliases,
            headers,
        })
    }

    async fn collect_project(
        &self,
        client: &Client,
        sink: &Arc<Assignments>,
        project: &Project,
    ) -> Result<Vec<BranchFailure>> {
        let stories_url = format!("{}/projects/{}/stories", self.config.api_base, project.id);
        let query = [
            ("limit", self.config.story_limit.to_string()),
            ("filter", ACTIVE_STORY_FILTER.to_string()),
        ];
        let stories: Vec<Story> =
            get_json(client, &stories_url, self.headers.clone(), &query).await?;

        debug!(
            "project {} has {} unaccepted stories",
            project.name,
            stories.len()
        );

        let outcomes = fan_out(stories, self.config.max_concurrent, |story| {
            let fetcher = self.clone();
            let client = client.clone();
            let sink = Arc::clone(sink);
            let project_name = project.name.clone();
            async move {
                let scope = format!("story {} in {}", story.id, project_name);
                match fetcher
                    .collect_story(&client, &sink, &project_name, &story)
                    .await
                {
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

    async fn collect_story(
        &self,
        client: &Client,
        sink: &Assignments,
        project_name: &str,
        story: &Story,
    ) -> Result<()> {
        let owners_url = format!(
            "{}/projects/{}/stories/{}/owners",
            self.config.api_base, story.project_id, story.id
        );
        let owners: Vec<Owner> = get_json(client, &owners_url, self.headers.clone(), &[]).await?;

        let story_url = story_show_url(story.id);
        for owner in owners {
            sink.record_as(
                &self.aliases,
                &owner.username,
                WorkItem::new(project_name, story.name.clone(), story_url.clone()),
            );
        }

        Ok(())
    }
}

#[async_trait]
impl Source for PivotalSource {
    fn name(&self) -> &'static str {
        "pivotal"
    }

    async fn collect(
        &self,
        client: &Client,
        sink: &Arc<Assignments>,
    ) -> Result<Vec<BranchFailure>> {
        let projects_url = format!("{}/projects", self.config.api_base);
        let projects: Vec<Project> =
            get_json(client, &projects_url, self.headers.clone(), &[]).await?;

        info!("pivotal: account has {} projects", projects.len());

        let outcomes = fan_out(projects, self.config.max_concurrent, |project| {
            let fetcher = self.clone();
            let client = client.clone();
            let sink = Arc::clone(sink);
            async move {
                let scope = format!("project {}", project.name);
                match fetcher.collect_project(&client, &sink, &project).await {
                    Ok(nested) => nested,
                    Err(error) => {
                        warn!("{} fetch failed, skipping: {}", scope, error);
                        vec![BranchFailure::new(scope, error)]
                    }
                }
            }
        })
        .await?;

        Ok(outcomes.into_iter().flatten().collect())
    }
}

fn story_show_url(story_id: u64) -> String {
    format!("{}/{}", STORY_SHOW_URL, story_id)
}
