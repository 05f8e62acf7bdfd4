//! HTTP behavior of the axum router, over a real socket.

use std::net::SocketAddr;
use std::sync::Arc;

use path402_crypto::verify_token;
use path402_gate::{
    router, Challenge, DiscoveryDocument, DISCOVERY_PATH, HEADER_NONCE, HEADER_PAYER,
    HEADER_PAYMENT, HEADER_PRICE_PAID, HEADER_SERVED_BY, HEADER_TOKEN, HEADER_VERSION,
    STATS_PATH,
};
use path402_store::ServeLedger;
use path402_test_utils::{static_payload, stub_gate, test_secret, tx_id, TEST_SERVER};
use path402_types::{LedgerStats, PROTOCOL_VERSION};
use reqwest::StatusCode;
use tokio::net::TcpListener;

/// Spawn the router on an ephemeral port and return its base URL.
async fn spawn() -> (String, path402_store::SqliteServeLedger) {
    let test = stub_gate();
    let app = router(Arc::new(test.gate));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{}", addr), test.serves)
}

#[tokio::test]
async fn unpaid_request_gets_402_with_invoice() {
    let (base, _) = spawn().await;
    let response = reqwest::get(format!("{}/$doc", base)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
        response.headers().get(HEADER_VERSION).unwrap(),
        PROTOCOL_VERSION
    );
    let challenge: Challenge = response.json().await.unwrap();
    assert_eq!(challenge.price, 1000);
    assert_eq!(challenge.curve, "sqrt_decay");
    assert_eq!(challenge.nonce.len(), 32);
}

#[tokio::test]
async fn paid_request_gets_content_and_token() {
    let (base, serves) = spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/$doc", base);

    let challenge: Challenge = client.get(&url).send().await.unwrap().json().await.unwrap();

    let response = client
        .get(&url)
        .header(HEADER_PAYMENT, tx_id(42))
        .header(HEADER_NONCE, &challenge.nonce)
        .header(HEADER_PAYER, "reader-1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers.get(HEADER_SERVED_BY).unwrap(), TEST_SERVER);
    assert_eq!(headers.get(HEADER_PRICE_PAID).unwrap(), "1000");
    let token = headers.get(HEADER_TOKEN).unwrap().to_str().unwrap();
    assert_eq!(verify_token(token, &test_secret()).unwrap().path, "/$doc");

    let body = response.bytes().await.unwrap();
    assert_eq!(body.as_ref(), static_payload("/$doc").as_slice());

    let events = serves.events("/$doc", 10).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].served_to, "reader-1");
}

#[tokio::test]
async fn payer_falls_back_to_socket_address() {
    let (base, serves) = spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/$doc", base);

    let challenge: Challenge = client.get(&url).send().await.unwrap().json().await.unwrap();
    client
        .get(&url)
        .header(HEADER_PAYMENT, tx_id(1))
        .header(HEADER_NONCE, &challenge.nonce)
        .send()
        .await
        .unwrap();

    let events = serves.events("/$doc", 10).unwrap();
    assert_eq!(events[0].served_to, "127.0.0.1");
}

#[tokio::test]
async fn replayed_nonce_gets_402() {
    let (base, _) = spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/$doc", base);

    let challenge: Challenge = client.get(&url).send().await.unwrap().json().await.unwrap();
    for expected in [StatusCode::OK, StatusCode::PAYMENT_REQUIRED] {
        let response = client
            .get(&url)
            .header(HEADER_PAYMENT, tx_id(9))
            .header(HEADER_NONCE, &challenge.nonce)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn head_with_payment_does_not_redeem() {
    let (base, serves) = spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/$doc", base);

    let challenge: Challenge = client.get(&url).send().await.unwrap().json().await.unwrap();

    let response = client
        .head(&url)
        .header(HEADER_PAYMENT, tx_id(7))
        .header(HEADER_NONCE, &challenge.nonce)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(serves.supply("/$doc").unwrap(), 0);

    let response = client
        .get(&url)
        .header(HEADER_PAYMENT, tx_id(7))
        .header(HEADER_NONCE, &challenge.nonce)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(serves.supply("/$doc").unwrap(), 1);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (base, _) = spawn().await;
    let response = reqwest::get(format!("{}/$nothing", base)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/$nothing"));
    assert!(body["suggestion"].is_string());
}

#[tokio::test]
async fn non_get_methods_are_rejected() {
    let (base, _) = spawn().await;
    let response = reqwest::Client::new()
        .post(format!("{}/$doc", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn discovery_and_stats_are_free() {
    let (base, _) = spawn().await;
    let client = reqwest::Client::new();

    let document: DiscoveryDocument = client
        .get(format!("{}{}", base, DISCOVERY_PATH))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(document.served_by, TEST_SERVER);
    assert_eq!(document.offerings.len(), 1);
    assert_eq!(document.offerings[0].path, "/$doc");

    let url = format!("{}/$doc", base);
    let challenge: Challenge = client.get(&url).send().await.unwrap().json().await.unwrap();
    client
        .get(&url)
        .header(HEADER_PAYMENT, tx_id(5))
        .header(HEADER_NONCE, &challenge.nonce)
        .send()
        .await
        .unwrap();

    let stats: LedgerStats = client
        .get(format!("{}{}", base, STATS_PATH))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.total_serves, 1);
    assert_eq!(stats.total_revenue, 1000);
    assert_eq!(stats.distinct_paths, 1);
}
