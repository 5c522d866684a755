#![allow(clippy::unwrap_used)]
// Remote-mode store behaviour against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use farmacia_core::{
    BroadcastNotifier, Controller, CoreError, Credentials, DataMode, DocumentHeader, DocumentKind,
    DocumentStatus, EntityId, NewLineItem, NotificationKind, SessionConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller, BroadcastNotifier) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": 5, "nome": "Ana", "email": "ana@farmacia.com" }
        })))
        .mount(&server)
        .await;

    let config = SessionConfig {
        api_url: format!("{}/api", server.uri()).parse().unwrap(),
        mode: DataMode::Remote,
        credentials: Some(Credentials {
            email: "ana@farmacia.com".into(),
            password: "s3cret".to_string().into(),
        }),
        ..SessionConfig::default()
    };
    let notifier = BroadcastNotifier::default();
    let controller = Controller::with_notifier(config, Arc::new(notifier.clone())).unwrap();
    controller.authenticate().await.unwrap();
    (server, controller, notifier)
}

fn perda_record(id: u64, motivo: &str) -> serde_json::Value {
    json!({
        "id": id,
        "data_perda": "2024-02-26",
        "motivo": motivo,
        "itens": [{ "id": 1, "produto": "Medicamento A", "quantidade": 10, "lote": "LOTE123" }]
    })
}

async fn mount_perdas(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/perdas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([perda_record(1, "Vencimento")])))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_store_starts_empty_and_refreshes() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.refresh().await.unwrap(), 1);

    let doc = store.get(&EntityId::from("1")).unwrap();
    assert_eq!(doc.summary(), "Vencimento");
    assert_eq!(doc.status(), DocumentStatus::Draft);
    assert_eq!(doc.items().len(), 1);
}

#[tokio::test]
async fn create_posts_header_and_stores_backend_record() {
    let (server, controller, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/perdas"))
        .and(body_json(json!({ "data_perda": "2024-03-01", "motivo": "Quebra" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 17, "data_perda": "2024-03-01", "motivo": "Quebra"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    let header = DocumentHeader::from_pairs(
        DocumentKind::Perda,
        [("data_perda", "2024-03-01"), ("motivo", "Quebra")],
    )
    .unwrap();
    let doc = store.create(header).await.unwrap();

    assert_eq!(doc.id, EntityId::from("17"));
    assert!(doc.items().is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn invalid_header_never_reaches_backend() {
    let (server, controller, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/saidas"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Saida).unwrap();
    let header =
        DocumentHeader::from_pairs(DocumentKind::Saida, [("nome_paciente", "Maria Santos")]).unwrap();
    assert!(matches!(store.create(header).await, Err(CoreError::Validation { .. })));
}

#[tokio::test]
async fn failed_finalize_leaves_local_state_untouched() {
    let (server, controller, notifier) = setup().await;
    mount_perdas(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/perdas/1/efetivar"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "falha" })))
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();
    let mut events = notifier.subscribe();

    let err = store.finalize(&"1".into()).await.unwrap_err();
    assert!(matches!(err, CoreError::Transport { status: Some(500), .. }), "{err:?}");
    assert_eq!(store.get(&"1".into()).unwrap().status(), DocumentStatus::Draft);
    assert_eq!(events.try_recv().unwrap().kind, NotificationKind::Error);
}

#[tokio::test]
async fn finalize_posts_efetivar_then_flips_status() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/perdas/1/efetivar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();
    let doc = store.finalize(&"1".into()).await.unwrap();
    assert_eq!(doc.status(), DocumentStatus::Effective);

    // Second attempt is rejected locally.
    assert!(matches!(
        store.finalize(&"1".into()).await,
        Err(CoreError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn add_item_puts_full_document() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/perdas/1"))
        .and(body_partial_json(json!({ "motivo": "Vencimento", "status": "draft" })))
        .respond_with(|req: &wiremock::Request| {
            // Echo the document back, as the backend stores it.
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200).set_body_json(body)
        })
        .expect(1)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();
    let doc = store
        .add_item(&"1".into(), NewLineItem::new("Medicamento B", 3, "LOTE456"))
        .await
        .unwrap();
    assert_eq!(doc.items().len(), 2);
    assert_eq!(store.get(&"1".into()).unwrap().items().len(), 2);
}

/// Echo the PUT body back after `delay`, so a write stays in flight.
async fn mount_slow_put(server: &MockServer, delay: Duration) {
    Mock::given(method("PUT"))
        .and(path("/api/perdas/1"))
        .respond_with(move |req: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200).set_body_json(body).set_delay(delay)
        })
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn finalize_waits_for_in_flight_item_add() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;
    mount_slow_put(&server, Duration::from_millis(300)).await;
    Mock::given(method("POST"))
        .and(path("/api/perdas/1/efetivar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();

    let adding = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .add_item(&"1".into(), NewLineItem::new("Medicamento B", 3, "LOTE456"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let finalized = store.finalize(&"1".into()).await.unwrap();
    let added = adding.await.unwrap().unwrap();

    assert_eq!(added.status(), DocumentStatus::Draft);
    assert_eq!(finalized.items().len(), 2);
    let doc = store.get(&"1".into()).unwrap();
    assert_eq!(doc.status(), DocumentStatus::Effective);
    assert_eq!(doc.items().len(), 2);
}

#[tokio::test]
async fn delete_waits_for_in_flight_item_add() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;
    mount_slow_put(&server, Duration::from_millis(300)).await;
    Mock::given(method("DELETE"))
        .and(path("/api/perdas/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();

    let adding = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .add_item(&"1".into(), NewLineItem::new("Medicamento B", 3, "LOTE456"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    store.delete(&"1".into()).await.unwrap();
    assert!(adding.await.unwrap().is_ok());

    assert!(store.is_empty());
    assert!(matches!(store.get(&"1".into()), Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn failed_update_keeps_old_header() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;

    Mock::given(method("PUT"))
        .and(path("/api/perdas/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();
    let header = DocumentHeader::from_pairs(
        DocumentKind::Perda,
        [("data_perda", "2024-02-27"), ("motivo", "Avaria")],
    )
    .unwrap();

    let err = store.update(&"1".into(), header).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Perda"), "{err:?}");
    assert_eq!(store.get(&"1".into()).unwrap().summary(), "Vencimento");
}

#[tokio::test]
async fn failed_delete_keeps_document() {
    let (server, controller, _) = setup().await;
    mount_perdas(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/perdas/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = controller.documents(DocumentKind::Perda).unwrap();
    store.refresh().await.unwrap();
    assert!(store.delete(&"1".into()).await.is_err());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let config = SessionConfig {
        api_url: "http://127.0.0.1:9/api".parse().unwrap(),
        mode: DataMode::Remote,
        credentials: Some(Credentials {
            email: "ana@farmacia.com".into(),
            password: "x".to_string().into(),
        }),
        ..SessionConfig::default()
    };
    let controller = Controller::new(config).unwrap();
    let err = controller.authenticate().await.unwrap_err();
    assert!(matches!(err, CoreError::Transport { status: None, .. }), "{err:?}");
}

#[tokio::test]
async fn payment_posts_known_company() {
    let (server, controller, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/empresas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 2, "razao_social": "Empresa B", "cnpj": "98765432000110", "email": "fin@empresab.com"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/pagamentos"))
        .and(body_json(json!({ "empresa_id": "2" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    controller.pay(&"2".into()).await.unwrap();
}
