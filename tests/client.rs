use base64::{Engine, engine::general_purpose::STANDARD as b64};
use hmac::{Hmac, Mac};
use linepay_client::{
    CallContext, CallError, CancellationToken, ClientConfig, ConfigError, DefaultLinePayClient, LinePayClient,
    ReturnCode, TransactionId, TransportError,
    models::{
        CaptureRequest, ConfirmRequest, ConfirmUrlType, Currency, DetailsFields, DetailsRequest, PaymentOptions,
        PaymentsOptions, PaymentsPackage, PaymentsProduct, PaymentsRequest, RedirectUrls, RefundRequest,
    },
};
use serde_json::json;
use sha2::Sha256;
use std::{sync::Arc, time::Duration};
use wiremock::{
    Match, Mock, MockBuilder, MockServer, Request, ResponseTemplate,
    matchers::{body_json, header, header_exists, method, path, query_param},
};

const CHANNEL_ID: &str = "1656881004";
const CHANNEL_SECRET: &str = "c0b6e1f5d2f24dbf8a0c5cbd1ac1e2a4";
const TRANSACTION_ID: TransactionId = TransactionId(2020011500264285210);

/// Recomputes the signature from the request as received and compares it to the header.
struct ValidSignature;

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let header = |name: &str| request.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        let (Some(nonce), Some(signature)) = (header("x-line-authorization-nonce"), header("x-line-authorization"))
        else {
            return false;
        };
        let payload = if request.body.is_empty() {
            request.url.query().unwrap_or_default().to_string()
        } else {
            String::from_utf8_lossy(&request.body).into_owned()
        };
        let message = format!("{CHANNEL_SECRET}{}{payload}{nonce}", request.url.path());
        let mut mac = Hmac::<Sha256>::new_from_slice(CHANNEL_SECRET.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        b64.encode(mac.finalize().into_bytes()) == signature
    }
}

fn client(server: &MockServer) -> DefaultLinePayClient {
    DefaultLinePayClient::new(ClientConfig::new(CHANNEL_ID, CHANNEL_SECRET, server.uri())).unwrap()
}

fn auth_headers() -> MockBuilder {
    Mock::given(header("x-line-channelid", CHANNEL_ID))
        .and(header_exists("x-line-authorization-nonce"))
        .and(header_exists("x-line-authorization"))
        .and(header("content-type", "application/json"))
        .and(ValidSignature)
}

fn payments_request(order_id: &str, capture: Option<bool>) -> PaymentsRequest {
    PaymentsRequest {
        amount: 100,
        currency: Currency::Twd,
        order_id: order_id.into(),
        packages: vec![PaymentsPackage {
            id: "pkg_id_1".into(),
            amount: 100,
            name: Some("pkg_name_1".into()),
            user_fee: None,
            products: vec![PaymentsProduct {
                id: None,
                name: "prod_1".into(),
                image_url: None,
                quantity: 1,
                price: 100,
                original_price: None,
            }],
        }],
        redirect_urls: RedirectUrls {
            app_package_name: None,
            confirm_url: "https://shop.example.com/confirm".into(),
            confirm_url_type: Some(ConfirmUrlType::Client),
            cancel_url: "https://shop.example.com/cancel".into(),
        },
        options: capture.map(|capture| PaymentsOptions {
            payment: Some(PaymentOptions { capture: Some(capture), pay_type: None }),
            display: None,
        }),
    }
}

fn payments_response() -> serde_json::Value {
    json!({
        "returnCode": "0000",
        "returnMessage": "Success.",
        "info": {
            "paymentUrl": {
                "web": "https://sandbox-web-pay.line.me/web/payment/wait?transactionReserveId=abc",
                "app": "line://pay/payment/abc"
            },
            "transactionId": TRANSACTION_ID.0,
            "paymentAccessToken": "187568751124"
        }
    })
}

#[tokio::test]
async fn payments_request_is_signed_and_decoded() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/request"))
        .and(body_json(json!({
            "amount": 100,
            "currency": "TWD",
            "orderId": "test_order_15",
            "packages": [{
                "id": "pkg_id_1",
                "amount": 100,
                "name": "pkg_name_1",
                "products": [{ "name": "prod_1", "quantity": 1, "price": 100 }]
            }],
            "redirectUrls": {
                "confirmUrl": "https://shop.example.com/confirm",
                "confirmUrlType": "CLIENT",
                "cancelUrl": "https://shop.example.com/cancel"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(payments_response()))
        .expect(1)
        .mount(&server)
        .await;

    let response =
        client(&server).payments_request(&CallContext::background(), &payments_request("test_order_15", None)).await.unwrap();

    assert!(response.is_success());
    let info = response.info.unwrap();
    assert!(!info.payment_url.web.is_empty());
    assert!(!info.payment_url.app.is_empty());
    assert_eq!(info.transaction_id, TRANSACTION_ID);
}

#[tokio::test]
async fn deferred_capture_flag_is_sent() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/request"))
        .and(DeferredCapture)
        .respond_with(ResponseTemplate::new(200).set_body_json(payments_response()))
        .expect(1)
        .mount(&server)
        .await;

    let request = payments_request("test_order_29", Some(false));
    let response = client(&server).payments_request(&CallContext::background(), &request).await.unwrap();
    assert!(response.is_success());
}

struct DeferredCapture;

impl Match for DeferredCapture {
    fn matches(&self, request: &Request) -> bool {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return false,
        };
        body["options"]["payment"]["capture"] == json!(false)
    }
}

#[tokio::test]
async fn confirm_targets_transaction() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/2020010800227854310/confirm"))
        .and(body_json(json!({ "amount": 100, "currency": "TWD" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returnCode": "0000",
            "returnMessage": "Success.",
            "info": {
                "orderId": "test_order_16",
                "transactionId": 2020010800227854310i64,
                "payInfo": [{ "method": "CREDIT_CARD", "amount": 100, "maskedCreditCardNumber": "************1111" }],
                "packages": [{ "id": "pkg_id_1", "amount": 100, "userFeeAmount": 0 }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ConfirmRequest { amount: 100, currency: Currency::Twd };
    let response = client(&server)
        .payments_confirm(&CallContext::background(), TransactionId(2020010800227854310), &request)
        .await
        .unwrap();

    let info = response.into_result().unwrap().unwrap();
    assert_eq!(info.order_id, "test_order_16");
    assert_eq!(info.pay_info[0].masked_credit_card_number.as_deref(), Some("************1111"));
    assert_eq!(info.packages[0].user_fee_amount, Some(0));
    assert!(info.packages[0].products.is_empty());
}

#[tokio::test]
async fn capture_of_pending_authorization_succeeds() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/authorizations/2020011500264285210/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returnCode": "0000",
            "returnMessage": "Success.",
            "info": {
                "orderId": "test_order_29",
                "transactionId": TRANSACTION_ID.0,
                "payInfo": [{ "method": "CREDIT_CARD", "amount": 100 }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CaptureRequest { amount: 100, currency: Currency::Twd };
    let response =
        client(&server).payments_capture(&CallContext::background(), TRANSACTION_ID, &request).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.info.unwrap().transaction_id, TRANSACTION_ID);
}

#[tokio::test]
async fn capture_without_pending_authorization_is_a_business_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/payments/authorizations/2020011500264285210/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returnCode": "1165",
            "returnMessage": "A transaction has already been voided."
        })))
        .mount(&server)
        .await;

    let request = CaptureRequest { amount: 100, currency: Currency::Twd };
    let response =
        client(&server).payments_capture(&CallContext::background(), TRANSACTION_ID, &request).await.unwrap();

    assert!(!response.is_success());
    assert_eq!(response.return_code, ReturnCode("1165".into()));
    let err = response.into_result().unwrap_err();
    assert_eq!(err.return_code, "1165");
}

#[tokio::test]
async fn void_and_refund() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/authorizations/2020011500264285210/void"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "returnCode": "0000", "returnMessage": "Success." })))
        .expect(1)
        .mount(&server)
        .await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/2020011500264285210/refund"))
        .and(body_json(json!({ "refundAmount": 40 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returnCode": "0000",
            "returnMessage": "Success.",
            "info": { "refundTransactionId": 2020011500264285299i64, "refundTransactionDate": "2020-01-15T03:00:00Z" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let ctx = CallContext::background();
    assert!(client.payments_void(&ctx, TRANSACTION_ID).await.unwrap().is_success());

    let refund = client.payments_refund(&ctx, TRANSACTION_ID, &RefundRequest { refund_amount: Some(40) }).await.unwrap();
    assert_eq!(refund.info.unwrap().refund_transaction_id, TransactionId(2020011500264285299));
}

#[tokio::test]
async fn details_signs_query_string() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("GET"))
        .and(path("/v3/payments"))
        .and(query_param("transactionId", "2020011300254002010"))
        .and(query_param("orderId", "test_order_15"))
        .and(query_param("fields", "ALL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "returnCode": "0000",
            "returnMessage": "success",
            "info": [{
                "transactionId": 2020011300254002010i64,
                "transactionDate": "2020-01-13T09:37:13Z",
                "transactionType": "PAYMENT",
                "orderId": "test_order_15",
                "payInfo": [{ "method": "CREDIT_CARD", "amount": 100 }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = DetailsRequest {
        transaction_ids: vec![TransactionId(2020011300254002010)],
        order_ids: vec!["test_order_15".into()],
        fields: Some(DetailsFields::All),
    };
    let response = client(&server).payments_details(&CallContext::background(), &request).await.unwrap();
    let details = response.info.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].order_id.as_deref(), Some("test_order_15"));
}

#[tokio::test]
async fn payment_status_carries_result_in_return_code() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("GET"))
        .and(path("/v3/payments/requests/2020011500264285210/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "returnCode": "0110", "returnMessage": "Authorized." })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).payment_status(&CallContext::background(), TRANSACTION_ID).await.unwrap();
    assert_eq!(response.return_code, ReturnCode::CHECK_AUTHORIZED);
}

#[tokio::test]
async fn cancellation_aborts_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payments_response()).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let ctx = CallContext::background().with_cancellation(token.clone());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = client(&server).payments_request(&ctx, &payments_request("test_order_15", None)).await.unwrap_err();
    assert!(err.is_cancelled(), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn deadline_aborts_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payments_response()).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = CallContext::background().with_timeout(Duration::from_millis(50));
    let err = client(&server).payments_request(&ctx, &payments_request("test_order_15", None)).await.unwrap_err();
    assert!(err.is_timeout(), "{err:?}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .payments_request(&CallContext::background(), &payments_request("test_order_15", None))
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Nothing listens on port 9 of the loopback address.
    let config = ClientConfig::new(CHANNEL_ID, CHANNEL_SECRET, "http://127.0.0.1:9");
    let client = DefaultLinePayClient::new(config).unwrap();

    let err = client.payment_status(&CallContext::background(), TRANSACTION_ID).await.unwrap_err();
    assert!(matches!(err, CallError::Transport(TransportError::Http(_))), "{err:?}");
    assert!(!err.to_string().contains("127.0.0.1"), "{err}");
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    auth_headers()
        .and(method("POST"))
        .and(path("/v3/payments/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payments_response()))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(client(&server));
    let calls = (0..8).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            let request = payments_request(&format!("order_{i}"), None);
            client.payments_request(&CallContext::background(), &request).await
        })
    });

    for call in calls.collect::<Vec<_>>() {
        assert!(call.await.unwrap().unwrap().is_success());
    }
}

#[test]
fn missing_credentials_fail_at_construction() {
    let err = DefaultLinePayClient::new(ClientConfig::sandbox("", CHANNEL_SECRET)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingChannelId));

    let err = DefaultLinePayClient::new(ClientConfig::sandbox(CHANNEL_ID, "")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingChannelSecret));
    assert!(!err.to_string().contains(CHANNEL_SECRET));
}
