//! Background cover refresh for newly saved entries.
//!
//! The caller stores the entry with a placeholder first, then hands the
//! website to [`spawn_cover_refresh`]. When a different cover is found the
//! `on_update` callback persists it.

use crate::pipeline::{CoverPipeline, ResolveOptions};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Resolve a cover off the caller's task and report a changed URL.
///
/// The handle yields the URL passed to `on_update`, or `None` if nothing
/// was found or the cover already matches `current_cover`.
pub fn spawn_cover_refresh<F, Fut>(
    pipeline: Arc<CoverPipeline>, website: String, current_cover: String, options: ResolveOptions, on_update: F,
) -> JoinHandle<Option<String>>
where
    F: FnOnce(String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let found = pipeline.resolve_cover(&website, options).await?;
        if found == current_cover {
            tracing::debug!(url = %website, "cover unchanged");
            return None;
        }

        tracing::info!(url = %website, cover = %found, "updating cover");
        on_update(found.clone()).await;
        Some(found)
    })
}
