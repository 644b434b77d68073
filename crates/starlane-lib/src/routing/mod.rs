//! Route finding orchestration.
//!
//! This module provides:
//! - [`RouteFindingOptions`] - what to search for
//! - [`RouteFindingResult`] - ranked routes or a classified failure
//! - [`RouteFinder`] - the pipeline tying pruning, transit discovery, graph
//!   construction, path search, assembly and caching together
//! - [`RouteSearchHandle`] - a cancellable background search with progress
//!
//! # Pipeline
//!
//! 1. Prune stars by category and affiliation exclusions.
//! 2. Refuse star lists larger than the configured vertex ceiling.
//! 3. Check the origin and destination survived pruning.
//! 4. Discover transits within the distance bounds.
//! 5. Build the graph and check the endpoints are connected.
//! 6. Search the K shortest loopless paths.
//! 7. Assemble ranked, styled routes.
//!
//! Every stage failure surfaces as a [`RouteFindingResult::Failure`]; the
//! finder never panics across its public boundary.
//!
//! # Example
//!
//! ```ignore
//! use starlane_lib::{DatasetId, RouteFinder, RouteFindingOptions, RoutingConfig};
//!
//! let finder = RouteFinder::new(RoutingConfig::default());
//! let options = RouteFindingOptions::new("Sol", "Wolf 359", 0.0, 8.0, 3);
//! let result = finder.find_routes(&options, &stars, &DatasetId::new("local"));
//! ```

mod task;

pub use task::{RouteSearchHandle, SearchProgress};

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::assemble::{RouteAssembler, RouteColor, RouteStyle, RoutingMetric};
use crate::cache::{CacheStatistics, RouteCache, RouteCacheKey};
use crate::config::RoutingConfig;
use crate::error::{Endpoint, Error, ErrorKind, Result};
use crate::graph::GraphBuilder;
use crate::path::k_shortest_paths_cancellable;
use crate::prune::prune_stars;
use crate::star::{DatasetId, StarCatalog, StarNode};
use crate::transit::{AdaptiveTransits, DistanceBounds, TransitCalculator};

/// Parameters of a single route search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFindingOptions {
    pub origin: String,
    pub destination: String,
    /// Minimum jump length in light-years, inclusive.
    pub lower_bound: f64,
    /// Maximum jump length in light-years, inclusive.
    pub upper_bound: f64,
    /// Number of alternative routes requested.
    pub max_paths: usize,
    /// Category letters to remove, such as `"M"`.
    #[serde(default)]
    pub category_exclusions: BTreeSet<String>,
    /// Affiliation tags to remove.
    #[serde(default)]
    pub affiliation_exclusions: BTreeSet<String>,
    #[serde(default)]
    pub style: RouteStyle,
}

impl RouteFindingOptions {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        lower_bound: f64,
        upper_bound: f64,
        max_paths: usize,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            lower_bound,
            upper_bound,
            max_paths,
            category_exclusions: BTreeSet::new(),
            affiliation_exclusions: BTreeSet::new(),
            style: RouteStyle::default(),
        }
    }

    pub fn exclude_category(mut self, letter: impl Into<String>) -> Self {
        self.category_exclusions.insert(letter.into());
        self
    }

    pub fn exclude_affiliation(mut self, tag: impl Into<String>) -> Self {
        self.affiliation_exclusions.insert(tag.into());
        self
    }

    pub fn with_style(mut self, style: RouteStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_color(mut self, color: RouteColor) -> Self {
        self.style.color = color;
        self
    }

    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.style.line_width = line_width;
        self
    }

    fn validate(&self) -> Result<DistanceBounds> {
        if self.max_paths == 0 {
            return Err(Error::NoPathsRequested);
        }
        DistanceBounds::new(self.lower_bound, self.upper_bound)
    }
}

/// Ranked routes between one origin and destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossibleRoutes {
    /// Display label, `Route <origin> to <destination>`.
    pub label: String,
    pub dataset: DatasetId,
    /// Routes ordered by rank, shortest first.
    pub routes: Vec<RoutingMetric>,
}

impl PossibleRoutes {
    fn new(origin: &str, destination: &str, dataset: &DatasetId, routes: Vec<RoutingMetric>) -> Self {
        Self {
            label: format!("Route {origin} to {destination}"),
            dataset: dataset.clone(),
            routes,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The rank 1 route.
    pub fn shortest(&self) -> Option<&RoutingMetric> {
        self.routes.first()
    }

    /// Apply a caller's display attributes to routes found under another
    /// request. Alternates keep their colours.
    fn restyle(&mut self, style: RouteStyle, dataset: &DatasetId) {
        self.dataset = dataset.clone();
        for route in &mut self.routes {
            route.descriptor.dataset = dataset.clone();
            route.descriptor.line_width = style.line_width;
            if route.rank == 1 {
                route.descriptor.color = style.color;
            }
        }
    }
}

/// Classified failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a route search. Exactly one variant is ever produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteFindingResult {
    Success(PossibleRoutes),
    Failure(RouteFailure),
}

impl RouteFindingResult {
    pub fn from_error(error: &Error) -> Self {
        Self::Failure(RouteFailure {
            kind: error.kind(),
            message: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether the search stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == Some(ErrorKind::Cancellation)
    }

    pub fn routes(&self) -> Option<&PossibleRoutes> {
        match self {
            Self::Success(routes) => Some(routes),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RouteFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Failure kind, or `None` on success.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.failure().map(|failure| failure.kind)
    }
}

impl From<Error> for RouteFindingResult {
    fn from(error: Error) -> Self {
        Self::from_error(&error)
    }
}

impl From<Result<PossibleRoutes>> for RouteFindingResult {
    fn from(result: Result<PossibleRoutes>) -> Self {
        match result {
            Ok(routes) => Self::Success(routes),
            Err(error) => Self::from_error(&error),
        }
    }
}

/// Which parts of a request identify it in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheScope {
    /// Algorithmic options only.
    #[default]
    Options,
    /// Options plus a fingerprint of the star names supplied.
    Stars,
    /// Options plus the dataset identity.
    Dataset,
}

/// Per-call controls that are not part of the search itself.
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Consult and populate the route cache.
    pub use_cache: bool,
    pub cache_scope: CacheScope,
    /// Checked between stages and between path search iterations.
    pub cancel: CancellationToken,
    /// Receives stage notifications when present.
    pub progress: Option<UnboundedSender<SearchProgress>>,
}

impl FindOptions {
    pub fn uncached() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn report(&self, progress: SearchProgress) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(progress);
        }
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_scope: CacheScope::default(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }
}

/// Finds ranked alternative routes between two stars.
///
/// A finder is cheap to share behind an [`Arc`]; searches on the same finder
/// may run concurrently and share its cache.
pub struct RouteFinder {
    config: RoutingConfig,
    cache: Arc<RouteCache>,
    transits: Arc<dyn TransitCalculator>,
    assembler: RouteAssembler,
}

impl RouteFinder {
    pub fn new(config: RoutingConfig) -> Self {
        let cache = Arc::new(RouteCache::new(config.cache_capacity));
        Self::with_cache(config, cache)
    }

    /// Create a finder backed by an existing (possibly shared) cache.
    pub fn with_cache(config: RoutingConfig, cache: Arc<RouteCache>) -> Self {
        Self {
            transits: Arc::new(AdaptiveTransits::new(config.kd_tree_threshold)),
            assembler: RouteAssembler::new(config.alternate_colors),
            config,
            cache,
        }
    }

    /// Replace the transit discovery strategy.
    pub fn with_transit_calculator(mut self, transits: Arc<dyn TransitCalculator>) -> Self {
        self.transits = transits;
        self
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    /// Search with default controls: cached, not cancellable, silent.
    ///
    /// A cached result is returned with `options.style` and `dataset`
    /// applied, so only the paths are shared between requests.
    pub fn find_routes(
        &self,
        options: &RouteFindingOptions,
        stars: &[StarNode],
        dataset: &DatasetId,
    ) -> RouteFindingResult {
        self.find_routes_with(options, stars, dataset, &FindOptions::default())
    }

    /// Search with explicit cache, cancellation and progress controls.
    pub fn find_routes_with(
        &self,
        options: &RouteFindingOptions,
        stars: &[StarNode],
        dataset: &DatasetId,
        find: &FindOptions,
    ) -> RouteFindingResult {
        info!(
            origin = %options.origin,
            destination = %options.destination,
            lower = options.lower_bound,
            upper = options.upper_bound,
            max_paths = options.max_paths,
            stars = stars.len(),
            "finding routes"
        );

        let key = find.use_cache.then(|| match find.cache_scope {
            CacheScope::Options => RouteCacheKey::from_options(options),
            CacheScope::Stars => RouteCacheKey::with_stars(options, stars),
            CacheScope::Dataset => RouteCacheKey::with_dataset(options, dataset),
        });

        if let Some(key) = &key {
            if let Some(hit) = self.cache.get(key) {
                info!(%key, "returning cached routes");
                find.report(SearchProgress::CacheHit);
                find.report(SearchProgress::Finished { success: true });
                return match hit {
                    RouteFindingResult::Success(mut routes) => {
                        routes.restyle(options.style, dataset);
                        RouteFindingResult::Success(routes)
                    }
                    failure => failure,
                };
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_pipeline(options, stars, dataset, find)
        }));

        let result = match outcome {
            Ok(Ok(routes)) => {
                info!(label = %routes.label, routes = routes.len(), "route search succeeded");
                RouteFindingResult::Success(routes)
            }
            Ok(Err(err)) if err.is_cancellation() => {
                info!("route search cancelled");
                RouteFindingResult::from_error(&err)
            }
            Ok(Err(err)) => {
                warn!(kind = ?err.kind(), error = %err, "route search failed");
                RouteFindingResult::from_error(&err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(%message, "route search panicked");
                RouteFindingResult::from_error(&Error::Internal { message })
            }
        };

        if let Some(key) = key {
            if result.is_success() {
                self.cache.put(key, result.clone());
            }
        }
        find.report(SearchProgress::Finished {
            success: result.is_success(),
        });
        result
    }

    /// Drop every cached result, e.g. after a dataset reload.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    fn run_pipeline(
        &self,
        options: &RouteFindingOptions,
        stars: &[StarNode],
        dataset: &DatasetId,
        find: &FindOptions,
    ) -> Result<PossibleRoutes> {
        find.checkpoint()?;
        let bounds = options.validate()?;

        let pruned = prune_stars(
            stars,
            &options.category_exclusions,
            &options.affiliation_exclusions,
        );
        find.report(SearchProgress::Pruned {
            remaining: pruned.len(),
        });

        let builder = GraphBuilder::new(self.config.max_vertices);
        builder.check_capacity(pruned.len())?;

        let catalog = StarCatalog::new(pruned.iter().copied());
        if !catalog.contains(&options.origin) {
            return Err(Error::UnknownStar {
                endpoint: Endpoint::Origin,
                name: options.origin.clone(),
            });
        }
        if !catalog.contains(&options.destination) {
            return Err(Error::UnknownStar {
                endpoint: Endpoint::Destination,
                name: options.destination.clone(),
            });
        }

        find.checkpoint()?;
        debug!(calculator = self.transits.name(), stars = catalog.len(), "discovering transits");
        let transits = self.transits.calculate(catalog.stars(), bounds)?;
        find.report(SearchProgress::TransitsFound {
            count: transits.len(),
        });
        if transits.is_empty() {
            return Err(Error::NoTransits {
                lower: bounds.lower(),
                upper: bounds.upper(),
            });
        }

        find.checkpoint()?;
        let graph = builder.build(&transits)?;
        find.report(SearchProgress::GraphBuilt {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        });
        if !graph.is_connected(&options.origin, &options.destination) {
            return Err(Error::Disconnected {
                origin: options.origin.clone(),
                destination: options.destination.clone(),
            });
        }

        let paths = k_shortest_paths_cancellable(
            &graph,
            &options.origin,
            &options.destination,
            options.max_paths,
            &find.cancel,
        )?;
        find.report(SearchProgress::PathsFound { count: paths.len() });

        find.checkpoint()?;
        let routes = self
            .assembler
            .assemble(&catalog, &paths, options.style, dataset);
        if routes.is_empty() {
            return Err(Error::EmptyResult {
                origin: options.origin.clone(),
                destination: options.destination.clone(),
            });
        }

        Ok(PossibleRoutes::new(
            &options.origin,
            &options.destination,
            dataset,
            routes,
        ))
    }
}

impl Default for RouteFinder {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl fmt::Debug for RouteFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteFinder")
            .field("config", &self.config)
            .field("transits", &self.transits.name())
            .field("cache", &self.cache)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
