use std::sync::Arc;

use intranet_cache::Repositories;
use intranet_db_memory::{InMemoryStore, Operation, seed::seed_demo};
use intranet_server::{AppConfig, AppState, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

async fn start_server() -> (
    String,
    Arc<InMemoryStore>,
    tokio::sync::oneshot::Sender<()>,
    JoinHandle<()>,
) {
    let store = Arc::new(InMemoryStore::new());
    seed_demo(&store).expect("seed demo data");
    let state = AppState::new(
        AppConfig::default(),
        &Repositories::from_backend(store.clone()),
    );
    let app = build_app(state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), store, tx, server)
}

#[tokio::test]
async fn healthz_ok() {
    let (base, _store, shutdown_tx, handle) = start_server().await;

    let resp = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn cache_admin_endpoints() {
    let (base, store, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let resp = client.get(format!("{base}/users/1")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let user: Value = resp.json().await.unwrap();
        assert_eq!(user["username"], "admin");
    }
    assert_eq!(store.calls(Operation::FindUser), 1);

    let stats: Value = client
        .get(format!("{base}/admin/cache/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["sweepRunning"], false);
    assert_eq!(stats["caches"].as_object().unwrap().len(), 8);
    assert_eq!(stats["caches"]["user"]["size"], 1);
    assert_eq!(stats["caches"]["user"]["hits"], 1);
    assert_eq!(stats["caches"]["user"]["misses"], 1);

    let report: Value = client
        .post(format!("{base}/admin/cache/cleanup"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["totalDeleted"], 0);
    assert_eq!(report["caches"].as_array().unwrap().len(), 8);
    let names: Vec<&str> = report["caches"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|outcome| outcome["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "user",
            "user-language",
            "organization",
            "branch",
            "onboarding",
            "filter-list",
            "saved-filter",
            "notification-settings",
        ]
    );
    assert!(report["caches"][0].get("error").is_none());

    let cleared: Value = client
        .post(format!("{base}/admin/cache/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared, json!({ "clearedCaches": 8 }));

    client.get(format!("{base}/users/1")).send().await.unwrap();
    assert_eq!(store.calls(Operation::FindUser), 2);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn errors_are_json_with_status() {
    let (base, store, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/users/999")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not-found");

    store.set_failing(Operation::FindSavedFilter, true);
    let resp = client.get(format!("{base}/filters/1")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    store.set_failing(Operation::UpdateUser, true);
    let resp = client
        .patch(format!("{base}/users/1"))
        .json(&json!({ "firstName": "Ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "unavailable");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn user_filter_group_over_http() {
    let (base, _store, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let groups: Value = client
        .get(format!("{base}/users/1/filter-groups/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let filters = groups[0]["filters"].as_array().unwrap();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["id"], 1);

    let resp = client
        .patch(format!("{base}/users/3"))
        .json(&json!({ "active": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let groups: Value = client
        .get(format!("{base}/users/1/filter-groups/tasks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(groups[0]["filters"].as_array().unwrap().len(), 2);

    let resp = client
        .post(format!("{base}/users/1/role"))
        .json(&json!({ "roleId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let language: Value = client
        .get(format!("{base}/users/1/language"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(language["language"], "en");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
