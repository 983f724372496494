//! Integration tests for the public option-service interface.
//!
//! Exercises resolution, memoization, single-flight loading, the global
//! TTL cache, and the derived handle views end to end.

use picklist::registry::seeds;
use picklist::{
    Definition, DefinitionCatalog, OptionItem, OptionService, PicklistError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A remote `countries` definition that counts invocations and resolves
/// after a short simulated latency.
fn counting_countries(calls: Arc<AtomicUsize>, latency: Duration) -> Definition {
    Definition::remote(move |_args| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(latency).await;
            Ok(vec![
                OptionItem::new("台灣", "TW"),
                OptionItem::new("日本", "JP"),
                OptionItem::new("美國", "US"),
                OptionItem::new("韓國", "KR"),
            ])
        }
    })
}

/// A remote `townships` definition that counts invocations per city.
fn counting_townships(calls: Arc<AtomicUsize>) -> Definition {
    Definition::remote(move |args| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let city = args.first().and_then(|v| v.as_str()).unwrap_or_default();
            Ok(match city {
                "TPE" => vec![
                    OptionItem::new("中正區", "100"),
                    OptionItem::new("大同區", "103"),
                    OptionItem::new("中山區", "104"),
                ],
                "KHH" => vec![
                    OptionItem::new("新興區", "800"),
                    OptionItem::new("前金區", "801"),
                ],
                _ => Vec::new(),
            })
        }
    })
}

fn catalog_with(key: &str, definition: Definition) -> DefinitionCatalog {
    DefinitionCatalog::builder()
        .define(key, definition)
        .build()
        .expect("unique keys")
}

// Consecutive reads return the same backing instance until a reload.
#[tokio::test]
async fn memoized_reads_share_one_snapshot() {
    let options = OptionService::new(seeds::stock_catalog());
    let handle = options.get("status");

    let first = handle.items();
    let second = handle.items();
    assert!(Arc::ptr_eq(&first, &second));

    // A second handle for the same key shares the same engine.
    let third = options.get("status").items();
    assert!(Arc::ptr_eq(&first, &third));

    let reloaded = handle.reload().await.unwrap();
    assert_eq!(reloaded.len(), first.len());
}

// Two reads before the first resolution settles invoke the definition once.
#[tokio::test]
async fn concurrent_reads_single_flight_the_fetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionService::new(catalog_with(
        "countries",
        counting_countries(calls.clone(), Duration::from_millis(50)),
    ));

    let handle = options.get("countries");
    assert!(handle.items().is_empty());
    assert!(handle.items().is_empty());
    assert!(handle.is_loading());

    let items = handle.ensure_loaded().await.unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!handle.is_loading());
    assert!(handle.is_loaded());
}

// A reload() arriving while a load is in flight joins it.
#[tokio::test]
async fn concurrent_reloads_join_the_inflight_attempt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionService::new(catalog_with(
        "countries",
        counting_countries(calls.clone(), Duration::from_millis(50)),
    ));

    let handle = options.get("countries");
    let (a, b) = tokio::join!(handle.reload(), handle.reload());
    assert_eq!(a.unwrap().len(), 4);
    assert_eq!(b.unwrap().len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Once settled, a reload re-invokes.
    handle.reload().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// A static list resolves idempotently.
#[tokio::test]
async fn static_resolution_is_idempotent() {
    let options = OptionService::new(seeds::stock_catalog());
    let handle = options.get("cities");

    let first = handle.items();
    for _ in 0..5 {
        assert!(Arc::ptr_eq(&first, &handle.items()));
    }
    assert_eq!(first.len(), 6);
}

// Within the TTL window an independent assembly seeds from the global
// cache; past the window it fetches again.
#[tokio::test]
async fn global_cache_honors_its_ttl() {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = catalog_with(
        "countries",
        counting_countries(calls.clone(), Duration::from_millis(5)),
    );

    let first = OptionService::builder(catalog.clone())
        .global_ttl(Duration::from_millis(80))
        .build();
    first.get("countries").ensure_loaded().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Same key, fresh engine, shared cache, inside the window.
    let second = OptionService::builder(catalog.clone())
        .shared_global_cache(first.global_cache())
        .build();
    let items = second.get("countries").ensure_loaded().await.unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(140)).await;

    let third = OptionService::builder(catalog)
        .shared_global_cache(first.global_cache())
        .build();
    third.get("countries").ensure_loaded().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// Parameterized resolutions never write through to the global cache.
#[tokio::test]
async fn global_cache_is_zero_argument_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = catalog_with("townships", counting_townships(calls.clone()));

    let first = OptionService::new(catalog.clone());
    first.get("townships").bind(["TPE"]).ensure_loaded().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = OptionService::builder(catalog)
        .shared_global_cache(first.global_cache())
        .build();
    second.get("townships").bind(["TPE"]).ensure_loaded().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// Derived views never mutate the backing snapshot.
#[tokio::test]
async fn derived_views_are_pure() {
    let options = OptionService::new(seeds::stock_catalog());
    let handle = options.get("status");
    let before = handle.items();

    assert_eq!(handle.with_all().len(), 3);
    assert_eq!(handle.with_other().len(), 3);
    assert_eq!(handle.exclude(["INACTIVE"]).len(), 1);
    assert_eq!(handle.only(["INACTIVE"]).len(), 1);

    let after = handle.items();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.len(), 2);
}

// Different argument tuples keep independent state and flags.
#[tokio::test]
async fn bound_arguments_are_isolated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionService::new(catalog_with("townships", counting_townships(calls.clone())));

    let tpe = options.get("townships").bind(["TPE"]);
    let khh = options.get("townships").bind(["KHH"]);

    let tpe_items = tpe.ensure_loaded().await.unwrap();
    assert_eq!(tpe_items.len(), 3);
    assert!(tpe.is_loaded());
    assert!(!khh.is_loaded());

    let khh_items = khh.ensure_loaded().await.unwrap();
    assert_eq!(khh_items.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Re-binding the same tuple reuses the memoized bucket.
    let tpe_again = options.get("townships").bind(["TPE"]).items();
    assert!(Arc::ptr_eq(&tpe_items, &tpe_again));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// Static status list with derived views.
#[tokio::test]
async fn status_scenario() {
    let options = OptionService::new(seeds::stock_catalog());
    let status = options.get("status");

    assert_eq!(status.label("ACTIVE"), "啟用");

    let with_all = status.with_all();
    assert_eq!(with_all[0].label, "全部");
    assert_eq!(with_all[0].value, "".into());
    assert_eq!(with_all[1].value, "ACTIVE".into());
    assert_eq!(with_all[2].value, "INACTIVE".into());

    let filtered = status.exclude(["INACTIVE"]);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].value, "ACTIVE".into());

    assert_eq!(status.len(), 2);
}

// Failures degrade passive reads and surface only to explicit awaiters.
#[tokio::test]
async fn failures_are_not_cached_and_do_not_leak_to_readers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let options = OptionService::new(catalog_with(
        "flaky",
        Definition::remote(move |_args| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                if n == 0 {
                    Err(PicklistError::Other("upstream unavailable".into()))
                } else {
                    Ok(vec![OptionItem::new("台灣", "TW")])
                }
            }
        }),
    ));

    let handle = options.get("flaky");

    // Passive read: triggers the failing load, stays empty, never panics.
    assert!(handle.items().is_empty());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(handle.items().is_empty() || handle.len() == 1);

    // Explicit reload surfaces the state of the next attempt.
    let items = handle.reload().await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(handle.is_loaded());
}

#[tokio::test]
async fn reload_replaces_the_backing_snapshot() {
    let calls = Arc::new(AtomicUsize::new(0));
    let options = OptionService::new(catalog_with(
        "countries",
        counting_countries(calls.clone(), Duration::from_millis(5)),
    ));

    let handle = options.get("countries");
    let first = handle.ensure_loaded().await.unwrap();
    let second = handle.reload().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(Arc::ptr_eq(&second, &handle.items()));
}
