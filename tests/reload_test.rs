//! Hot reload: watcher → channel → server swap.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use url_rewriter::config::load_rules;
use url_rewriter::config::watcher::RulesWatcher;
use url_rewriter::{HttpServer, Registry, RewriterConfiguration, Rewriter, ServerConfig};

mod common;

const GONE: &str = r#"
[[element]]
name = "if"
attributes = { url = "^/legacy" }
children = [{ name = "gone" }]
"#;

const REDIRECT: &str = r#"
[[element]]
name = "if"
attributes = { url = "^/legacy/(.*)$" }
children = [{ name = "redirect", attributes = { to = "/v2/$1" } }]
"#;

#[tokio::test]
async fn test_watcher_sends_rebuilt_configuration() {
    let file = common::rules_file(GONE);
    let registry = Registry::new();
    let initial = load_rules(file.path(), &registry).unwrap();
    assert_eq!(initial.rules().len(), 1);

    let (watcher, mut updates) = RulesWatcher::new(file.path(), registry);
    let _watcher = watcher.run().unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(file.path(), format!("{}\n[[element]]\nname = \"not-found\"\n", REDIRECT)).unwrap();

    // A write can surface as several events; wait for the complete document.
    let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(config) = updates.recv().await {
            if config.rules().len() == 2 {
                return Some(config);
            }
        }
        None
    })
    .await
    .expect("reload timed out")
    .expect("watcher channel closed");

    assert_eq!(reloaded.rules()[1].kind(), "set-status");
}

#[tokio::test]
async fn test_server_applies_updates() {
    let addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();

    let rewriter = Arc::new(Rewriter::new(common::rules(GONE)));
    let server = HttpServer::new(ServerConfig::default(), rewriter);
    let (tx, rx) = mpsc::unbounded_channel::<RewriterConfiguration>();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, Some(rx)).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let before = common::raw_get(addr, "/legacy/page").await;
    assert!(before.starts_with("HTTP/1.1 410"), "{}", before);

    tx.send(common::rules(REDIRECT)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let after = common::raw_get(addr, "/legacy/page").await;
    assert!(after.starts_with("HTTP/1.1 301"), "{}", after);
    assert!(after.to_ascii_lowercase().contains("location: /v2/page"), "{}", after);
}
