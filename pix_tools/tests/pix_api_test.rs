// Integration tests for `PixApi` using wiremock.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pix_tools::{PixApi, PixApiError, PixConfig, TokenProvider};
use prg_common::Brl;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, body_string_contains, header, method, path},
    Mock,
    MockServer,
    ResponseTemplate,
};

const PAYABLE_CODE: &str = "00020126580014br.gov.bcb.pix0136chave-recebedora52040000530398654041.005802BR";

fn test_config(server: &MockServer) -> PixConfig {
    PixConfig {
        base_url: server.uri(),
        client_id: "client-1".to_string(),
        client_secret: "s3cret".to_string().into(),
        receiving_key: "chave-recebedora".to_string(),
        ..PixConfig::default()
    }
}

async fn setup() -> (MockServer, PixApi) {
    let _ = env_logger::try_init();
    let server = MockServer::start().await;
    let api = PixApi::with_client(reqwest::Client::new(), test_config(&server));
    (server, api)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-123" })))
        .mount(server)
        .await;
}

async fn mount_payable_payload(server: &MockServer, txid: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/charges/{txid}/payable-payload")))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payableCodeBase64": BASE64.encode(PAYABLE_CODE),
            "qrImage": "data:image/png;base64,iVBORw0KGgo=",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn token_exchange_sends_form_encoded_credentials() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("scope=cob.read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = TokenProvider::new(Arc::new(reqwest::Client::new()), api.config().clone());
    let token = tokens.get_token().await.unwrap();
    assert_eq!(token.reveal(), "tok-123");
}

#[tokio::test]
async fn token_rejection_aborts_the_operation() {
    let (server, api) = setup().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let result = api.fetch_charge_status("tx-1").await;
    assert!(
        matches!(result, Err(PixApiError::TokenAcquisition(ref m)) if m.contains("403")),
        "expected TokenAcquisition error, got: {result:?}"
    );
}

#[tokio::test]
async fn create_charge_builds_the_request_and_decodes_the_payload() {
    let (server, api) = setup().await;
    // `create_charge` makes two authenticated calls, and each one fetches a
    // fresh token.
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok-123" })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/charges"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "expirationSecs": 3600,
            "payer": { "name": "João da Silva", "taxId": "12345678900" },
            "amount": "150.00",
            "receivingKey": "chave-recebedora",
            "description": "Pagamento de reserva",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "txid": "tx-55", "status": "ATIVA" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_payable_payload(&server, "tx-55").await;

    let charge = api.create_charge(Brl::from_reais(150), "João da Silva", "123.456.789-00").await.unwrap();
    assert_eq!(charge.transaction_id, "tx-55");
    assert_eq!(charge.payable_code, PAYABLE_CODE);
    assert_eq!(charge.qr_image, "data:image/png;base64,iVBORw0KGgo=");
}

#[tokio::test]
async fn create_charge_fails_as_a_unit_when_the_payload_fetch_fails() {
    let (server, api) = setup().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/charges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "txid": "tx-56", "status": "ATIVA" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/charges/tx-56/payable-payload"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such charge"))
        .mount(&server)
        .await;

    let result = api.create_charge(Brl::from_reais(80), "Maria", "98765432100").await;
    assert!(
        matches!(result, Err(PixApiError::PayloadFetch { ref txid, .. }) if txid == "tx-56"),
        "expected PayloadFetch error, got: {result:?}"
    );
}

#[tokio::test]
async fn completed_status_maps_to_completed() {
    let (server, api) = setup().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/charges/tx-9"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "txid": "tx-9", "status": "COMPLETED" })))
        .mount(&server)
        .await;

    let status = api.fetch_charge_status("tx-9").await.unwrap();
    assert!(status.completed);
    assert_eq!(status.provider_status, "COMPLETED");
    assert_eq!(status.transaction_id, "tx-9");
}

#[tokio::test]
async fn any_other_status_maps_to_not_completed() {
    let (server, api) = setup().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/charges/tx-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "txid": "tx-10", "status": "ATIVA" })))
        .mount(&server)
        .await;

    let status = api.fetch_charge_status("tx-10").await.unwrap();
    assert!(!status.completed);
    assert_eq!(status.provider_status, "ATIVA");
}

#[tokio::test]
async fn status_query_failure_names_the_transaction() {
    let (server, api) = setup().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/charges/tx-11"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider exploded"))
        .mount(&server)
        .await;

    let result = api.fetch_charge_status("tx-11").await;
    match result {
        Err(PixApiError::ChargeQuery { ref txid, ref message }) => {
            assert_eq!(txid, "tx-11");
            assert!(message.contains("500"), "expected status in message, got: {message}");
        },
        other => panic!("expected ChargeQuery error, got: {other:?}"),
    }
}

#[tokio::test]
async fn garbled_payable_code_is_rejected() {
    let (server, api) = setup().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/charges/tx-12/payable-payload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payableCodeBase64": "!!!not-base64!!!",
            "qrImage": "whatever",
        })))
        .mount(&server)
        .await;

    let result = api.fetch_payable_payload("tx-12").await;
    assert!(
        matches!(result, Err(PixApiError::PayloadFetch { ref message, .. }) if message.contains("base64")),
        "expected PayloadFetch error, got: {result:?}"
    );
}
