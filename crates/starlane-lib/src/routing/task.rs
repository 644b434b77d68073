//! Background route searches.
//!
//! A search runs on Tokio's blocking pool so the CPU-bound stages never stall
//! the async executor. The returned [`RouteSearchHandle`] can cancel it,
//! stream stage notifications, and await the final result.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::{FindOptions, RouteFinder, RouteFindingOptions, RouteFindingResult};
use crate::error::Error;
use crate::star::{DatasetId, StarNode};

/// Stage notifications emitted while a search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SearchProgress {
    /// Served from the cache; no stage ran.
    CacheHit,
    Pruned { remaining: usize },
    TransitsFound { count: usize },
    GraphBuilt { vertices: usize, edges: usize },
    PathsFound { count: usize },
    /// Always the last notification of a search.
    Finished { success: bool },
}

/// Handle to a search running in the background.
#[derive(Debug)]
pub struct RouteSearchHandle {
    cancel: CancellationToken,
    progress: UnboundedReceiver<SearchProgress>,
    task: JoinHandle<RouteFindingResult>,
}

impl RouteSearchHandle {
    /// Request cancellation. The search stops at its next checkpoint and
    /// resolves to a cancellation failure.
    pub fn cancel(&self) {
        debug!("route search cancellation requested");
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stage notifications, ending with [`SearchProgress::Finished`].
    pub fn progress(&mut self) -> &mut UnboundedReceiver<SearchProgress> {
        &mut self.progress
    }

    /// Wait for the search to finish.
    pub async fn result(self) -> RouteFindingResult {
        match self.task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => Error::Cancelled.into(),
            Err(join_error) => {
                error!(error = %join_error, "route search task failed");
                Error::Internal {
                    message: join_error.to_string(),
                }
                .into()
            }
        }
    }
}

impl RouteFinder {
    /// Start a cached search in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_search(
        self: &Arc<Self>,
        options: RouteFindingOptions,
        stars: Vec<StarNode>,
        dataset: DatasetId,
    ) -> RouteSearchHandle {
        self.spawn_search_with(options, stars, dataset, FindOptions::default())
    }

    /// Start a background search with explicit controls. The handle cancels
    /// through `find.cancel`, and any progress sender in `find` is replaced
    /// by the handle's own channel.
    pub fn spawn_search_with(
        self: &Arc<Self>,
        options: RouteFindingOptions,
        stars: Vec<StarNode>,
        dataset: DatasetId,
        mut find: FindOptions,
    ) -> RouteSearchHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        find.progress = Some(sender);
        let cancel = find.cancel.clone();

        let finder = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || {
            finder.find_routes_with(&options, &stars, &dataset, &find)
        });

        RouteSearchHandle {
            cancel,
            progress: receiver,
            task,
        }
    }
}
