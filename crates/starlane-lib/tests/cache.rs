mod common;

use std::sync::Arc;
use std::thread;

use common::{local_dataset, local_stars};
use starlane_lib::{
    CacheScope, DatasetId, FindOptions, RouteCache, RouteCacheKey, RouteColor, RouteFinder,
    RouteFindingOptions, RoutingConfig,
};

fn options() -> RouteFindingOptions {
    RouteFindingOptions::new("Sol", "Tau Ceti", 0.0, 9.0, 3)
}

#[test]
fn colour_only_changes_hit_the_cache() {
    let finder = RouteFinder::default();
    let stars = local_stars();

    let cyan = finder.find_routes(&options(), &stars, &local_dataset());
    let cyan = cyan.routes().expect("route exists");
    let red_color = RouteColor::rgb(1.0, 0.0, 0.0);
    let red = finder.find_routes(
        &options().with_color(red_color).with_line_width(3.0),
        &stars,
        &DatasetId::new("reloaded"),
    );
    let red = red.routes().expect("served from the cache");

    assert_eq!(red.dataset, DatasetId::new("reloaded"));
    assert_eq!(red.routes[0].descriptor.color, red_color);
    assert_ne!(cyan.routes[0].descriptor.color, red_color);
    for (before, after) in cyan.routes.iter().zip(&red.routes) {
        assert_eq!(before.path, after.path);
        assert_eq!(after.descriptor.line_width, 3.0);
        assert_eq!(after.descriptor.dataset, DatasetId::new("reloaded"));
    }
    for alternate in &red.routes[1..] {
        assert_ne!(alternate.descriptor.color, red_color);
    }
    let stats = finder.cache_statistics();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn failures_are_recomputed() {
    let finder = RouteFinder::default();
    let stars = local_stars();
    let disconnected = RouteFindingOptions::new("Sol", "Tau Ceti", 0.0, 8.0, 3);

    assert!(!finder.find_routes(&disconnected, &stars, &local_dataset()).is_success());
    assert!(!finder.find_routes(&disconnected, &stars, &local_dataset()).is_success());
    let stats = finder.cache_statistics();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);
}

#[test]
fn clear_cache_forces_recomputation() {
    let finder = RouteFinder::default();
    let stars = local_stars();
    finder.find_routes(&options(), &stars, &local_dataset());
    finder.clear_cache();
    finder.find_routes(&options(), &stars, &local_dataset());

    let stats = finder.cache_statistics();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.size, 1);
}

#[test]
fn star_scope_separates_different_star_lists() {
    let finder = RouteFinder::default();
    let find = FindOptions {
        cache_scope: CacheScope::Stars,
        ..FindOptions::default()
    };
    let all = local_stars();
    let without_cygni: Vec<_> = all
        .iter()
        .filter(|star| star.name != "61 Cygni")
        .cloned()
        .collect();

    finder.find_routes_with(&options(), &all, &local_dataset(), &find);
    finder.find_routes_with(&options(), &without_cygni, &local_dataset(), &find);
    finder.find_routes_with(&options(), &all, &local_dataset(), &find);

    let stats = finder.cache_statistics();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.hits, 1);
}

#[test]
fn dataset_scope_separates_datasets() {
    let finder = RouteFinder::default();
    let find = FindOptions {
        cache_scope: CacheScope::Dataset,
        ..FindOptions::default()
    };
    let stars = local_stars();
    finder.find_routes_with(&options(), &stars, &DatasetId::new("one"), &find);
    let other = finder.find_routes_with(&options(), &stars, &DatasetId::new("two"), &find);

    assert_eq!(finder.cache_statistics().size, 2);
    assert_eq!(other.routes().unwrap().dataset, DatasetId::new("two"));
}

#[test]
fn finder_respects_cache_capacity() {
    let config = RoutingConfig {
        cache_capacity: 2,
        ..RoutingConfig::default()
    };
    let finder = RouteFinder::new(config);
    let stars = local_stars();
    for destination in ["Sirius", "Procyon", "Tau Ceti"] {
        let options = RouteFindingOptions::new("Sol", destination, 0.0, 9.0, 2);
        assert!(finder.find_routes(&options, &stars, &local_dataset()).is_success());
    }

    assert_eq!(finder.cache_statistics().size, 2);
    assert_eq!(finder.cache().evictions(), 1);
    let evicted = RouteCacheKey::from_options(&RouteFindingOptions::new("Sol", "Sirius", 0.0, 9.0, 2));
    assert!(!finder.cache().contains(&evicted));
}

#[test]
fn shared_cache_serves_concurrent_searches() {
    let cache = Arc::new(RouteCache::new(8));
    let finder = Arc::new(RouteFinder::with_cache(RoutingConfig::default(), cache.clone()));
    let stars = Arc::new(local_stars());
    let expected = finder.find_routes(&options(), &stars, &local_dataset());

    thread::scope(|scope| {
        for _ in 0..8 {
            let finder = Arc::clone(&finder);
            let stars = Arc::clone(&stars);
            let expected = &expected;
            scope.spawn(move || {
                for _ in 0..25 {
                    let result = finder.find_routes(&options(), &stars, &local_dataset());
                    assert_eq!(&result, expected);
                }
            });
        }
    });

    assert_eq!(cache.size(), 1);
    assert_eq!(cache.hits(), 200);
    assert_eq!(cache.misses(), 1);
}

#[test]
fn concurrent_puts_never_exceed_capacity() {
    let cache = Arc::new(RouteCache::new(4));
    let finder = RouteFinder::default();
    let stars = local_stars();
    let results: Vec<_> = ["Sirius", "Procyon", "Wolf 359", "Barnard's Star", "Ross 154", "Lalande 21185"]
        .iter()
        .map(|destination| {
            let options = RouteFindingOptions::new("Sol", *destination, 0.0, 9.0, 1);
            let result = finder.find_routes(&options, &stars, &local_dataset());
            assert!(result.is_success(), "{destination}");
            (RouteCacheKey::from_options(&options), result)
        })
        .collect();

    thread::scope(|scope| {
        for (key, result) in &results {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for _ in 0..50 {
                    cache.put(key.clone(), result.clone());
                    assert!(cache.size() <= 4);
                    let _ = cache.get(key);
                }
            });
        }
    });

    assert_eq!(cache.size(), 4);
}
