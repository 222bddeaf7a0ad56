#![allow(clippy::unwrap_used, clippy::panic, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use rtfm_core::codec::INVENTORY_VERSION;
use rtfm_core::{
    Compression, Config, Error, HttpFetcher, InventoryHeader, InventoryRecord, Lookup,
    QueryResolver, SourceCache, SourceConfig, encode_inventory,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(name: &str, directive: &str, location: &str, display: &str) -> InventoryRecord {
    let (domain, subdirective) = directive.split_once(':').unwrap();
    InventoryRecord {
        name: name.to_string(),
        domain: domain.to_string(),
        subdirective: subdirective.to_string(),
        priority: 1,
        location: location.to_string(),
        display_name: display.to_string(),
    }
}

fn discord_inventory() -> Vec<u8> {
    let header = InventoryHeader {
        format_version: INVENTORY_VERSION.to_string(),
        project_name: "discord.py".to_string(),
        project_version: "2.4".to_string(),
        compression: Compression::Zlib,
    };
    let records = vec![
        record("discord", "py:module", "index.html#module-$", "-"),
        record("discord.Client", "py:class", "api.html#$", "-"),
        record("discord.Client.connect", "py:method", "api.html#$", "-"),
        record("discord.on_message", "py:function", "api.html#$", "-"),
        record(
            "discord.abc.Messageable.send",
            "py:method",
            "api.html#$",
            "-",
        ),
        record("discord.ext.commands.Bot", "py:class", "ext/commands/api.html#$", "-"),
        record("intents_primer", "std:label", "intents.html#$", "A Primer to Gateway Intents"),
        record("faq", "std:doc", "faq.html", "Frequently Asked Questions"),
        record("discord", "py:module", "elsewhere.html", "-"),
    ];
    encode_inventory(&header, &records).unwrap()
}

async fn serve(bytes: Vec<u8>, expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

fn resolver_for(server: &MockServer) -> QueryResolver {
    let config = Config {
        sources: vec![SourceConfig::new("latest", server.uri()).primary()],
        ..Config::default()
    };
    let fetcher = HttpFetcher::with_timeout(Duration::from_secs(5)).unwrap();
    let cache = SourceCache::new(
        config.sources.clone(),
        Arc::new(fetcher),
        config.normalize_rules(),
        config.lookup.chunk_size,
    );
    QueryResolver::new(Arc::new(cache), &config.lookup).unwrap()
}

#[tokio::test]
async fn test_lookup_ranks_normalized_keys() {
    // Given: a served discord.py inventory
    let server = serve(discord_inventory(), 1).await;
    let resolver = resolver_for(&server);

    // When: looking up an abbreviated event name
    let lookup = resolver.resolve("latest", Some("on_msg")).await.unwrap();

    // Then: the event comes first with its namespace stripped and URL joined
    let Lookup::Found { entries } = lookup else {
        panic!("expected matches, got {lookup:?}");
    };
    assert_eq!(entries[0].key, "on_message");
    assert_eq!(
        entries[0].url,
        format!("{}/api.html#discord.on_message", server.uri())
    );
}

#[tokio::test]
async fn test_lookup_redirects_interface_members() {
    let server = serve(discord_inventory(), 1).await;
    let resolver = resolver_for(&server);

    let Lookup::Found { entries } = resolver.resolve("latest", Some("send")).await.unwrap() else {
        panic!("expected matches");
    };

    assert_eq!(entries[0].key, "abc.Messageable.send");
}

#[tokio::test]
async fn test_std_records_are_prefixed_and_modules_deduplicated() {
    let server = serve(discord_inventory(), 1).await;
    let resolver = resolver_for(&server);

    let table = resolver.cache().get_or_build("latest").await.unwrap();

    assert_eq!(table.project_name, "discord.py");
    assert_eq!(table.project_version, "2.4");
    assert_eq!(
        table.get("label:A Primer to Gateway Intents"),
        Some(format!("{}/intents.html#intents_primer", server.uri()).as_str())
    );
    assert_eq!(
        table.get("label:Frequently Asked Questions"),
        Some(format!("{}/faq.html", server.uri()).as_str())
    );
    // first module record wins
    assert_eq!(
        table.get("discord"),
        Some(format!("{}/index.html#module-discord", server.uri()).as_str())
    );
    assert!(table.get("commands.Bot").is_none());
    assert!(table.get("Bot").is_some());
}

#[tokio::test]
async fn test_empty_query_returns_base_url_without_fetching() {
    let server = serve(discord_inventory(), 0).await;
    let resolver = resolver_for(&server);

    let lookup = resolver.resolve("latest", None).await.unwrap();
    assert_eq!(lookup, Lookup::Index { url: server.uri() });

    let blank = resolver.resolve("latest", Some("   ")).await.unwrap();
    assert_eq!(blank, Lookup::Index { url: server.uri() });
}

#[tokio::test]
async fn test_unmatched_query_is_not_found() {
    let server = serve(discord_inventory(), 1).await;
    let resolver = resolver_for(&server);

    let lookup = resolver.resolve("latest", Some("zzzzqqqq")).await.unwrap();
    assert_eq!(lookup, Lookup::NotFound);
}

#[tokio::test]
async fn test_concurrent_lookups_fetch_once() {
    // Given: many simultaneous first lookups
    let server = serve(discord_inventory(), 1).await;
    let resolver = Arc::new(resolver_for(&server));

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve("latest", Some("Client")).await })
        })
        .collect();

    // Then: every lookup succeeds and the mock sees a single request
    for task in tasks {
        let lookup = task.await.unwrap().unwrap();
        assert!(matches!(lookup, Lookup::Found { .. }));
    }
}

#[tokio::test]
async fn test_missing_inventory_is_source_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let resolver = resolver_for(&server);

    let err = resolver.resolve("latest", Some("Client")).await.unwrap_err();

    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(err.is_recoverable());
    assert!(resolver.cache().cached("latest").is_none());
}

#[tokio::test]
async fn test_refresh_swaps_in_new_inventory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(discord_inventory()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let header = InventoryHeader {
        format_version: INVENTORY_VERSION.to_string(),
        project_name: "discord.py".to_string(),
        project_version: "2.5".to_string(),
        compression: Compression::Zlib,
    };
    let updated = encode_inventory(
        &header,
        &[record("discord.Client.close", "py:method", "api.html#$", "-")],
    )
    .unwrap();
    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(updated))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let before = resolver.cache().get_or_build("latest").await.unwrap();
    assert_eq!(before.project_version, "2.4");

    let after = resolver.cache().refresh("latest").await.unwrap();
    assert_eq!(after.project_version, "2.5");
    assert!(after.get("Client.close").is_some());
    assert!(after.get("on_message").is_none());
    assert_eq!(resolver.cache().cached("latest").unwrap().project_version, "2.5");
}
