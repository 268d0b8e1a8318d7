use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use workmap_core::{Result, WorkmapError};

/// Items requested per page on paginated collection endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One GET against a JSON array endpoint. Non-2xx statuses and undecodable
/// bodies fail with the request URL attached; there are no retries.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: HeaderMap,
    query: &[(&str, String)],
) -> Result<Vec<T>> {
    let response = client
        .get(url)
        .headers(headers)
        .query(query)
        .send()
        .await
        .map_err(|e| WorkmapError::Transport {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(WorkmapError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response.json::<Vec<T>>().await.map_err(|e| WorkmapError::Decode {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

/// Fetch every page of a `page`/`per_page` paginated collection and return
/// the concatenation.
///
/// Pages are requested sequentially starting at page 1 with a fixed
/// `per_page`. A short page (fewer items than requested) is the end-of-data
/// signal, so a collection that is an exact multiple of the page size costs
/// one extra request that comes back empty. Stateless; safe to call
/// concurrently from many branches with the same client.
pub async fn fetch_all_pages<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    base_query: &[(&str, String)],
    page_size: usize,
) -> Result<Vec<T>> {
    let mut all = Vec::new();

    for page in 1usize.. {
        let mut query: Vec<(&str, String)> = base_query.to_vec();
        query.push(("page", page.to_string()));
        query.push(("per_page", page_size.to_string()));

        let batch: Vec<T> = get_json(client, url, headers.clone(), &query).await?;
        let batch_len = batch.len();
        all.extend(batch);

        debug!(
            "page {} of {} returned {} items ({} total)",
            page,
            url,
            batch_len,
            all.len()
        );

        if batch_len < page_size {
            break;
        }
    }

    Ok(all)
}
