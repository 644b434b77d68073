//! Starlane library entry points.
//!
//! This crate finds ranked alternative routes between two stars of a star
//! catalogue. A star list is pruned by category and affiliation, transits are
//! discovered between stars whose distance lies within the requested bounds,
//! and the K shortest loopless paths through the resulting graph are
//! returned as styled, ranked routes. Higher-level consumers (the CLI) should
//! only depend on the functions exported here instead of reimplementing
//! behavior.
//!

#![deny(warnings)]

pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod path;
pub mod prune;
pub mod routing;
pub mod star;
pub mod transit;

pub use assemble::{
    AlternateColorPolicy, RouteAssembler, RouteColor, RouteDescriptor, RouteStyle, RoutingMetric,
};
pub use cache::{CacheStatistics, RouteCache, RouteCacheKey};
pub use config::RoutingConfig;
pub use error::{Endpoint, Error, ErrorKind, Result};
pub use graph::{build_graph, GraphBuilder, RouteGraph};
pub use path::{k_shortest_paths, k_shortest_paths_cancellable, shortest_path, GraphPath};
pub use prune::prune_stars;
pub use routing::{
    CacheScope, FindOptions, PossibleRoutes, RouteFailure, RouteFinder, RouteFindingOptions,
    RouteFindingResult, RouteSearchHandle, SearchProgress,
};
pub use star::{DatasetId, StarCatalog, StarId, StarNode, StarPosition};
pub use transit::{
    AdaptiveTransits, BruteForceTransits, DistanceBounds, KdTreeTransits, TransitCalculator,
    TransitEdge,
};
pub use tokio_util::sync::CancellationToken;
