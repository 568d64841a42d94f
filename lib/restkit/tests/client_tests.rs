//! End-to-end tests of `RestClient` over `HyperTransport` using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert2::{check, let_assert};
use restkit::header::{HeaderName, HeaderValue};
use restkit::{
    CancellationToken, Credential, Error, HeaderMap, Hooks, HyperTransport, Method, Operation,
    RestClient, RestServiceSettings, StatusCode, TimeSpan, path_params, query_params,
};
use serde::{Deserialize, Serialize};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Customer {
    id: u64,
    name: String,
}

#[derive(Debug, Serialize)]
struct Measurement {
    label: &'static str,
    elapsed: TimeSpan,
}

fn settings(server: &MockServer) -> RestServiceSettings {
    RestServiceSettings::new(format!("{}/api", server.uri())).expect("valid settings")
}

async fn last_request(server: &MockServer) -> wiremock::Request {
    server
        .received_requests()
        .await
        .and_then(|mut requests| requests.pop())
        .expect("a request was received")
}

#[tokio::test]
async fn typed_get_with_path_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/customers/42/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![Customer {
            id: 42,
            name: "Ada".to_owned(),
        }]))
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));

    let operation = Operation::get("customers/{id}/orders")
        .path(path_params! { "id" => 42 }.expect("valid"))
        .query(query_params! { "Ids" => [7, 11, 21], "q" => "a b" }.expect("valid"));
    let call = client
        .send_typed::<Vec<Customer>, _>(operation)
        .await
        .expect("call succeeds");

    let_assert!(Some(customers) = call.value());
    check!(customers.len() == 1);
    check!(call.info().is_success());
    check!(call.info().method() == Method::Get);

    let received = last_request(&server).await;
    check!(received.url.query() == Some("Ids=7&Ids=11&Ids=21&q=a%20b"));
}

#[tokio::test]
async fn basic_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("Authorization", "Basic bWU6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let settings = RestServiceSettings::builder(format!("{}/api", server.uri()))
        .basic_auth("me", "secret")
        .build()
        .expect("valid settings");
    let client = RestClient::connect(settings);

    let call = client
        .send_typed::<Customer, _>(Operation::get("me"))
        .await
        .expect("call succeeds");

    check!(call.value().is_none());
    check!(call.info().status() == StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn external_authentication_uses_async_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let settings = RestServiceSettings::builder(server.uri())
        .external_auth()
        .build()
        .expect("valid settings");
    let hooks = Hooks::builder()
        .credential_async(|| async { Some(Credential::bearer("fresh-token")) })
        .build();
    let client = RestClient::builder(settings)
        .named(|_: Option<&str>, settings: &RestServiceSettings| HyperTransport::new(settings))
        .hooks(hooks)
        .build();

    client.send(Operation::get("secure")).await.expect("call succeeds");
}

#[tokio::test]
async fn json_payload_is_posted() {
    let server = MockServer::start().await;
    let input = Customer {
        id: 0,
        name: "Grace".to_owned(),
    };
    let output = Customer {
        id: 7,
        name: "Grace".to_owned(),
    };
    Mock::given(method("POST"))
        .and(path("/api/customers"))
        .and(header("Content-Type", "application/json; charset=utf-8"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(&output))
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));

    let created = client
        .send_typed::<Customer, _>(Operation::post("customers").data(&input))
        .await
        .expect("call succeeds")
        .into_value();

    check!(created == Some(output));
}

#[tokio::test]
async fn timespan_uses_fixed_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(body_json(serde_json::json!({
            "label": "warmup",
            "elapsed": "00:00:16.8253204",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));
    let measurement = Measurement {
        label: "warmup",
        elapsed: TimeSpan::from_ticks(168_253_204),
    };

    client
        .send(Operation::put("measurements/1").data(&measurement))
        .await
        .expect("call succeeds");
}

#[tokio::test]
async fn error_status_carries_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("something wrong"))
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));

    let result = client.send_typed::<Customer, _>(Operation::get("customers/1")).await;

    let_assert!(Err(error) = result);
    check!(error.is_protocol());
    check!(error.is_client_error());
    check!(error.status() == Some(StatusCode::BAD_REQUEST));
    check!(error.reason_phrase() == Some("Bad Request"));
    check!(error.raw_body() == Some("something wrong"));
    check!(error.method() == Some(Method::Get));
    check!(error.url().map(|url| url.path()) == Some("/api/customers/1"));
}

#[tokio::test]
async fn unexpected_body_shape_is_a_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1000"))
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));

    let result = client.send_typed::<Customer, _>(Operation::get("customers/1")).await;

    let_assert!(Err(error) = result);
    check!(error.is_serialization());
    let_assert!(Some(type_name) = error.type_name());
    check!(type_name.ends_with("Customer"));
    check!(error.to_string().contains("Customer"));
}

#[tokio::test]
async fn serialization_errors_bypass_the_interceptor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1000"))
        .mount(&server)
        .await;
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let hooks = Hooks::builder()
        .after_call(move |_, error| {
            if error.is_some() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            false
        })
        .build();
    let client = RestClient::builder(settings(&server))
        .named(restkit::HyperTransportFactory::default())
        .hooks(hooks)
        .build();

    let result = client.send_typed::<Customer, _>(Operation::get("customers/1")).await;

    check!(result.is_err());
    check!(seen.load(Ordering::SeqCst) == 0);
}

#[tokio::test]
async fn interceptor_can_suppress_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such customer"))
        .mount(&server)
        .await;
    let hooks = Hooks::builder()
        .after_call(|response, _| !response.is_some_and(|r| r.status() == StatusCode::NOT_FOUND))
        .build();
    let client = RestClient::builder(settings(&server))
        .named(restkit::HyperTransportFactory::default())
        .hooks(hooks)
        .build();

    let typed = client
        .send_typed::<Customer, _>(Operation::get("customers/404"))
        .await
        .expect("suppressed");
    check!(typed.value().is_none());

    let raw = client
        .send(Operation::get("customers/404"))
        .await
        .expect("suppressed");
    check!(raw.value().status() == StatusCode::NOT_FOUND);
    check!(raw.value().text_lossy() == "no such customer");
}

#[tokio::test]
async fn header_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let settings = RestServiceSettings::builder(server.uri())
        .default_header("X-Tenant", "acme")
        .default_header("X-Region", "eu")
        .build()
        .expect("valid settings");
    let hooks = Hooks::builder()
        .common_headers(|| {
            let mut headers = HeaderMap::new();
            headers.insert("x-client", HeaderValue::from_static("common"));
            headers.insert("x-region", HeaderValue::from_static("us"));
            headers
        })
        .before_call(|request| {
            request
                .headers_mut()
                .insert("x-correlation", HeaderValue::from_static("c-1"));
        })
        .build();
    let client = RestClient::builder(settings)
        .named(restkit::HyperTransportFactory::default())
        .hooks(hooks)
        .build();

    let operation = Operation::get("ping")
        .header(HeaderName::from_static("x-client"), HeaderValue::from_static("call"));
    client.send(operation).await.expect("call succeeds");

    let received = last_request(&server).await;
    let values = |name: &str| -> Vec<String> {
        received
            .headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_owned))
            .collect()
    };
    check!(values("x-tenant") == ["acme"]);
    check!(values("x-region") == ["us"]);
    check!(values("x-client") == ["call"]);
    check!(values("x-correlation") == ["c-1"]);
    check!(values("accept") == ["application/json"]);
}

#[tokio::test]
async fn injected_transport_uses_settings_base_and_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(header("X-Tenant", "acme"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let settings = RestServiceSettings::builder(format!("{}/api", server.uri()))
        .default_header("X-Tenant", "acme")
        .build()
        .expect("valid settings");
    let transport = HyperTransport::builder(server.uri())
        .build()
        .expect("valid transport");
    let client = RestClient::builder(settings).direct(transport).build();

    let call = client.send(Operation::get("ping")).await.expect("call succeeds");

    check!(call.info().url().path() == "/api/ping");
    check!(call.value().status() == StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn transport_default_accept_wins_over_json_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Accept", "text/csv"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let settings = RestServiceSettings::builder(server.uri())
        .default_header("Accept", "text/csv")
        .build()
        .expect("valid settings");
    let client = RestClient::connect(settings);

    client.send(Operation::get("report")).await.expect("call succeeds");

    let received = last_request(&server).await;
    check!(received.headers.get_all("accept").iter().count() == 1);
}

#[tokio::test]
async fn cancellation_is_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let client = RestClient::connect(settings(&server));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = client
        .send_typed::<Customer, _>(Operation::get("slow").cancellation(cancel))
        .await;

    let_assert!(Err(Error::Cancelled) = result);
    let_assert!(Some(info) = client.last_call());
    check!(!info.has_response());
}

#[tokio::test]
async fn cancellation_can_be_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let client = RestClient::builder(settings(&server))
        .named(restkit::HyperTransportFactory::default())
        .throw_on_cancellation(false)
        .build();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let call = client
        .send_typed::<Customer, _>(Operation::get("slow").cancellation(cancel))
        .await
        .expect("swallowed");

    check!(call.value().is_none());
    check!(call.info().status() == StatusCode::RESET_CONTENT);
    check!(!call.info().is_success());
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    let client = RestClient::builder(settings(&server))
        .named(|_: Option<&str>, settings: &RestServiceSettings| {
            HyperTransport::from_settings(settings)
                .timeout(Duration::from_millis(100))
                .build()
        })
        .build();

    let result = client.send(Operation::get("slow")).await;

    let_assert!(Err(error) = result);
    check!(error.is_timeout());
    check!(error.is_transport());
}

#[tokio::test]
async fn connection_failure_can_be_suppressed() {
    let hooks = Hooks::builder()
        .after_call(|response, error| !(response.is_none() && error.is_some_and(Error::is_transport)))
        .build();
    // Port 9 (discard) is not listened on in test environments.
    let settings = RestServiceSettings::new("http://127.0.0.1:9/").expect("valid settings");
    let client = RestClient::builder(settings)
        .named(restkit::HyperTransportFactory::default())
        .hooks(hooks)
        .build();

    let call = client.send(Operation::get("anything")).await.expect("suppressed");

    check!(!call.info().has_response());
    check!(call.value().status() == StatusCode::RESET_CONTENT);
    check!(call.value().body().is_empty());
}

#[tokio::test]
async fn named_transport_is_created_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let settings = RestServiceSettings::builder(server.uri())
        .name("catalog")
        .build()
        .expect("valid settings");
    let client = RestClient::builder(settings)
        .named(move |name: Option<&str>, settings: &RestServiceSettings| {
            assert_eq!(name, Some("catalog"));
            counter.fetch_add(1, Ordering::SeqCst);
            HyperTransport::new(settings)
        })
        .build();

    for _ in 0..3 {
        client.send(Operation::get("items")).await.expect("call succeeds");
    }

    check!(created.load(Ordering::SeqCst) == 1);
}
