#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use std::path::Path;
use std::time::Duration;

use assert_cmd::Command;
use rtfm_core::codec::INVENTORY_VERSION;
use rtfm_core::{Compression, InventoryHeader, InventoryRecord, encode_inventory};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create an `rtfm` command isolated from the user's environment.
pub fn rtfm_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtfm"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("RTFM_CONFIG_DIR", config_dir);
    cmd.env_remove("RTFM_CONFIG");
    cmd.env_remove("RTFM_OUTPUT_FORMAT");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write a config with a primary `latest` source on `server` and a `broken`
/// source whose inventory is missing.
pub fn write_config(config_dir: &Path, server: &MockServer) {
    let content = format!(
        r#"[fetch]
timeout_secs = 5

[[sources]]
key = "latest"
base_url = "{uri}"
primary = true
description = "test docs"

[[sources]]
key = "broken"
base_url = "{uri}/broken"
"#,
        uri = server.uri()
    );
    std::fs::write(config_dir.join("config.toml"), content).unwrap();
}

fn record(name: &str, directive: &str, location: &str) -> InventoryRecord {
    let (domain, subdirective) = directive.split_once(':').unwrap();
    InventoryRecord {
        name: name.to_string(),
        domain: domain.to_string(),
        subdirective: subdirective.to_string(),
        priority: 1,
        location: location.to_string(),
        display_name: "-".to_string(),
    }
}

pub fn inventory_bytes() -> Vec<u8> {
    let header = InventoryHeader {
        format_version: INVENTORY_VERSION.to_string(),
        project_name: "discord.py".to_string(),
        project_version: "2.4".to_string(),
        compression: Compression::Zlib,
    };
    let records = [
        record("discord.Client", "py:class", "api.html#$"),
        record("discord.Client.connect", "py:method", "api.html#$"),
        record("discord.on_message", "py:function", "api.html#$"),
        record("discord.abc.Messageable.send", "py:method", "api.html#$"),
    ];
    encode_inventory(&header, &records).unwrap()
}

/// Serve the test inventory at `/objects.inv`.
pub async fn serve_inventory() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(inventory_bytes()))
        .mount(&server)
        .await;
    server
}
