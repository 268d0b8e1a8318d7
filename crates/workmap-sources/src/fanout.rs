use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use workmap_core::{Result, WorkmapError};

/// Map over children concurrently, then join.
///
/// Spawns one task per item, bounded by `limit` in-flight permits, and joins
/// every task before returning; results come back in input order. This is the
/// fan-out primitive reused at each level of a traversal tree, so no branch
/// outlives its parent. A panicked branch surfaces as `WorkmapError::Join`
/// after every sibling has been joined.
pub async fn fan_out<T, F, Fut, R>(items: Vec<T>, limit: usize, f: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));

    let mut tasks = Vec::with_capacity(items.len());
    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let branch = f(item);
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            branch.await
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    let mut first_error = None;
    for task in tasks {
        match task.await {
            Ok(result) => results.push(result),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(WorkmapError::Join(e.to_string()));
                }
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(results),
    }
}
