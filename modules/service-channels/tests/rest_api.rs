#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Service channels routes behind the full contract stack.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use channels_http::{ContractLayerConfig, TraceabilityRules, apply_contract_layers};
use service_channels::domain::models::{AutomatedTellerMachine, PresentialChannel};
use service_channels::domain::service::Service;
use service_channels::infra::{
    FsObjectStore, InMemoryAtmRepository, InMemoryAutomatedTellerMachineRepository,
    InMemoryPresentialChannelRepository, RecordingPublisher, StaticUpstream,
};
use service_channels::{Adapters, ServiceChannels, ServiceChannelsConfig, UpstreamConfig};

const PREFIX: &str = "/service-channels/v1/api";

const TRACE_HEADERS: [(&str, &str); 7] = [
    ("Consumer-Sys-Code", "CHL-HB-WEB"),
    ("Consumer-Enterprise-Code", "BANCORIPLEY-CHL"),
    ("Consumer-Country-Code", "CHL"),
    ("Trace-Client-Req-Timestamp", "2024-07-15 10:30:45.123456-0400"),
    ("Trace-Source-Id", "0d6c3a3e-36ab-4b8e-8f43-1e4a8a3b1c55"),
    ("Channel-Name", "PWA"),
    ("Channel-Mode", "NO-PRESENCIAL"),
];

const ATM_UPSTREAM: &str = "http://atms.upstream/v1/automated-teller-machines";

struct Harness {
    app: Router,
    publisher: Arc<RecordingPublisher>,
    upstream: Arc<StaticUpstream>,
    objects: tempfile::TempDir,
}

fn harness() -> Harness {
    let objects = tempfile::tempdir().unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let upstream = Arc::new(StaticUpstream::default().with_body(
        format!("{ATM_UPSTREAM}/CL-900"),
        r#"{"Result": {"status": "OK", "data": {"data": {"atmIdentifier": "CL-900"}}}}"#,
    ));
    let service = Service::new(
        Arc::new(InMemoryAtmRepository::default()),
        Arc::new(InMemoryAutomatedTellerMachineRepository::with_records([
            AutomatedTellerMachine {
                atm_identifier: "CL-001".to_owned(),
                town_name: "Santiago".to_owned(),
                ..AutomatedTellerMachine::default()
            },
        ])),
        Arc::new(InMemoryPresentialChannelRepository::with_records([
            PresentialChannel {
                channel_identifier: "SUC-10".to_owned(),
                channel_type: "SUC".to_owned(),
                ..PresentialChannel::default()
            },
        ])),
    );
    let config = ServiceChannelsConfig {
        topics: vec!["channels-a".to_owned(), "channels-b".to_owned()],
        phone_channel_topics: vec!["phones".to_owned()],
        customer_data_topics: vec!["customers".to_owned()],
        storage_root: objects.path().to_path_buf(),
        upstream: UpstreamConfig {
            automated_teller_machines_url: Some(ATM_UPSTREAM.to_owned()),
            ..UpstreamConfig::default()
        },
        ..ServiceChannelsConfig::default()
    };
    let adapters = Adapters {
        store: Arc::new(FsObjectStore::new(objects.path())),
        publisher: publisher.clone(),
        upstream: upstream.clone(),
    };
    let module = ServiceChannels::with_parts(config, service, adapters);
    let router = module.router(Arc::new(TraceabilityRules::default()));
    Harness {
        app: apply_contract_layers(router, &ContractLayerConfig::default()),
        publisher,
        upstream,
        objects,
    }
}

impl Harness {
    async fn call(
        &self,
        method: &str,
        path: &str,
        traced: bool,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call_raw(method, path, traced, body.map(|b| b.to_string()))
            .await
    }

    async fn call_raw(
        &self,
        method: &str,
        path: &str,
        traced: bool,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{PREFIX}{path}"));
        if traced {
            for (name, value) in TRACE_HEADERS {
                builder = builder.header(name, value);
            }
        }
        let body = match body {
            Some(text) => {
                builder = builder.header("content-type", "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };
        let resp = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).expect("envelope is JSON"))
    }
}

fn source_description(body: &Value) -> &str {
    body["Result"]["SourceError"]["description"].as_str().unwrap()
}

fn push_body(event_type: &str, object: &str) -> Value {
    let data = json!({"bucket": "channels-bucket", "name": object}).to_string();
    json!({
        "message": {
            "attributes": {"eventType": event_type},
            "data": STANDARD.encode(data),
            "messageId": "42",
            "publishTime": "2024-07-15T10:30:45Z"
        },
        "subscription": "projects/p/subscriptions/electronic-channels"
    })
}

#[tokio::test]
async fn health_is_open_and_wrapped() {
    let h = harness();
    let (status, body) = h.call("GET", "/health", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Result": {
            "status": "OK",
            "description": "Request processed successfully",
            "data": {"status": "UP", "message": "API is healthy"}
        }})
    );
}

#[tokio::test]
async fn atm_crud_round() {
    let h = harness();
    let (status, body) = h
        .call(
            "POST",
            "/atms",
            true,
            Some(json!({
                "atmidentifier": "ATM-001",
                "atmtownname": "Santiago",
                "atmfromdatetime": "2024-01-01T08:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["Result"]["data"],
        json!({
            "id": 1,
            "atmidentifier": "ATM-001",
            "atmtownname": "Santiago",
            "atmfromdatetime": "2024-01-01T08:00:00.000000Z"
        })
    );

    let (status, body) = h.call("GET", "/atms/1", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Result"]["data"]["atmidentifier"], "ATM-001");

    let (status, body) = h
        .call(
            "PUT",
            "/atms/1",
            true,
            Some(json!({"atmidentifier": "ATM-001", "atmtownname": "Arica"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Result"]["data"]["atmtownname"], "Arica");

    let (status, body) = h.call("GET", "/atms", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Result"]["data"].as_array().unwrap().len(), 1);

    let (status, body) = h.call("DELETE", "/atms/1", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Result"]["data"], json!({"message": "ATM deleted successfully"}));

    let (status, body) = h.call("GET", "/atms/1", true, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(source_description(&body), "ATM not found");
}

#[tokio::test]
async fn atm_routes_require_trace_headers() {
    let h = harness();
    let (status, body) = h.call("GET", "/atms", false, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(source_description(&body), "Missing required headers");
    assert_eq!(
        body["Result"]["SourceError"]["ErrorSourceDetails"]["missingHeaders"]
            .as_array()
            .unwrap()
            .len(),
        7
    );
}

#[tokio::test]
async fn malformed_json_is_a_typed_bad_request() {
    let h = harness();
    let (status, body) = h
        .call_raw("POST", "/atms", true, Some("{not json".to_owned()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Result"]["CanonicalError"]["code"], "400");
    assert!(!source_description(&body).is_empty());
}

#[tokio::test]
async fn non_numeric_atm_id_is_rejected() {
    let h = harness();
    let (status, body) = h.call("GET", "/atms/abc", true, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(source_description(&body), "Invalid ATM id: abc");
}

#[tokio::test]
async fn duplicate_and_invalid_atms() {
    let h = harness();
    let atm = json!({"atmidentifier": "ATM-9"});
    h.call("POST", "/atms", true, Some(atm.clone())).await;
    let (status, body) = h.call("POST", "/atms", true, Some(atm)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(source_description(&body), "ATM with identifier ATM-9 already exists");

    let (status, body) = h.call("POST", "/atms", true, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        source_description(&body),
        "validation error: atmidentifier: is required"
    );
}

#[tokio::test]
async fn read_models_wrap_data() {
    let h = harness();
    let (status, body) = h.call("GET", "/automated-teller-machines", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"],
        json!({"data": [{"atmIdentifier": "CL-001", "atmTownName": "Santiago"}]})
    );

    let (status, body) = h.call("GET", "/presential-channels/SUC-10", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"]["data"],
        json!({"presentialChannelIdentifier": "SUC-10", "presentialChannelType": "SUC"})
    );

    let (status, body) = h.call("GET", "/presential-channels/NOPE", true, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(source_description(&body), "Presential Channel not found");
}

#[tokio::test]
async fn unknown_route_is_unexpected_not_found() {
    let h = harness();
    let (status, body) = h.call("GET", "/branches", false, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(source_description(&body), "An unexpected error occurred");
}

#[tokio::test]
async fn push_publishes_every_record_to_every_topic() {
    let h = harness();
    std::fs::write(
        h.objects.path().join("electronic channels.json"),
        concat!(
            r#"{"payload": {"BOPERS_WEB_CHANNEL": {"WEB_URL_ADDRESS": "https://bancoripley.cl"}}}"#,
            "\n",
            r#"{"payload": {"BOPERS_EMAIL_CHANNEL": {"EMAIL_ADDRESS": "hola@bancoripley.cl"}}}"#,
            "\n"
        ),
    )
    .unwrap();

    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "electronic%20channels.json")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"],
        json!({
            "status": "Electronic channel data processed and published successfully",
            "data_count": 2
        })
    );

    let messages = h.publisher.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].topic, "channels-a");
    assert_eq!(messages[1].topic, "channels-b");
    assert_eq!(
        messages[2].payload.as_ref(),
        br#"{"emailChannel":{"emailAddress":"hola@bancoripley.cl"}}"#
    );
}

#[tokio::test]
async fn push_ignores_unhandled_events() {
    let h = harness();
    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(push_body("OBJECT_DELETE", "gone.json")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"],
        json!({"status": "Event type not handled, message acknowledged"})
    );
    assert!(h.publisher.messages().is_empty());
}

#[tokio::test]
async fn push_with_bad_envelope_is_bad_request() {
    let h = harness();
    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(json!({
                "message": {"attributes": {"eventType": "OBJECT_FINALIZE"}, "data": "%%%"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source_description(&body).starts_with("error decoding message data"));
}

#[tokio::test]
async fn push_failures_are_internal_errors() {
    let h = harness();
    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "missing.json")),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        source_description(&body),
        "Error processing file: object does not exist: missing.json"
    );

    std::fs::write(h.objects.path().join("bad.json"), "{\"payload\": []}\n").unwrap();
    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(push_body("OBJECT_UPDATE", "bad.json")),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        source_description(&body),
        "Error transforming channel data: invalid payload structure"
    );
    assert!(h.publisher.messages().is_empty());
}

#[tokio::test]
async fn publish_failure_names_the_topic() {
    let h = harness();
    h.publisher.fail_topic("channels-b");
    std::fs::write(h.objects.path().join("one.json"), "{\"payload\": {}}\n").unwrap();

    let (status, body) = h
        .call(
            "POST",
            "/electronic-channels/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "one.json")),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(source_description(&body).contains("failed to publish message to topic channels-b"));
}

#[tokio::test]
async fn phone_push_publishes_to_phone_topics() {
    let h = harness();
    std::fs::write(
        h.objects.path().join("phones.json"),
        concat!(
            r#"{"payload": {"BOPERS_PHONE_CHANNEL": {"PHONE_NUMBER": "600"}}}"#,
            "\n",
            r#"{"payload": {"BOPERS_SMS_CHANNEL": {"SMS_AVAILABLE_SERVICES_CODE": "01,02"}}}"#,
            "\n"
        ),
    )
    .unwrap();

    let (status, body) = h
        .call(
            "POST",
            "/phone-channels/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "phones.json")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"],
        json!({
            "status": "Phone channel data processed and published successfully",
            "data_count": 2
        })
    );

    let messages = h.publisher.messages();
    let published: Vec<(&str, &[u8])> = messages
        .iter()
        .map(|m| (m.topic.as_str(), m.payload.as_ref()))
        .collect();
    assert_eq!(
        published,
        [
            ("phones", br#"{"phoneChannel":{"phoneNumber":"600"}}"#.as_slice()),
            (
                "phones",
                br#"{"smsChannel":{"smsAvailableServicesCode":["01","02"]}}"#.as_slice()
            ),
        ]
    );
}

#[tokio::test]
async fn phone_push_is_fail_fast() {
    let h = harness();
    std::fs::write(
        h.objects.path().join("phones.json"),
        "{\"payload\": {}}\n{\"payload\": 3}\n",
    )
    .unwrap();
    let (status, body) = h
        .call(
            "POST",
            "/phone-channels/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "phones.json")),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        source_description(&body),
        "Error transforming channel data: invalid payload structure"
    );
    assert!(h.publisher.messages().is_empty());
}

#[tokio::test]
async fn customer_push_skips_invalid_records_but_counts_them() {
    let h = harness();
    std::fs::write(
        h.objects.path().join("customers.json"),
        concat!(
            r#"{"payload": {"NAME": "Ana Maria Perez", "ID": "1-9"}}"#,
            "\n",
            r#"{"payload": "broken"}"#,
            "\n",
            r#"{"payload": {"NAME": "Luis"}}"#,
            "\n"
        ),
    )
    .unwrap();

    let (status, body) = h
        .call(
            "POST",
            "/customer-data/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "customers.json")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["Result"]["data"],
        json!({
            "status": "Customer data processed and published successfully",
            "data_count": 3
        })
    );

    let messages = h.publisher.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.topic == "customers"));
    let first: Value = serde_json::from_slice(&messages[0].payload).unwrap();
    assert_eq!(
        first,
        json!({
            "personalIdentification": {
                "customerFirstName": "Ana",
                "customerMiddleName": "Maria",
                "customerLastName": "Perez"
            },
            "personalAdditionalInfo": {"legalRepresentativeIdentification": "1-9"}
        })
    );
}

#[tokio::test]
async fn customer_push_publish_failure_is_internal_error() {
    let h = harness();
    h.publisher.fail_topic("customers");
    std::fs::write(
        h.objects.path().join("customers.json"),
        "{\"payload\": {\"NAME\": \"Ana\"}}\n",
    )
    .unwrap();
    let (status, body) = h
        .call(
            "POST",
            "/customer-data/push",
            false,
            Some(push_body("OBJECT_FINALIZE", "customers.json")),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(source_description(&body).starts_with("Error publishing message:"));
}

#[tokio::test]
async fn orchestration_unwraps_upstream_data_and_forwards_headers() {
    let h = harness();
    let (status, body) = h
        .call(
            "GET",
            "/orchestration/automated-teller-machines/CL-900",
            true,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Result"]["data"], json!({"atmIdentifier": "CL-900"}));

    let requests = h.upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{ATM_UPSTREAM}/CL-900"));
    assert!(
        requests[0]
            .headers
            .contains(&("channel-name".to_owned(), "PWA".to_owned()))
    );
}

#[tokio::test]
async fn orchestration_failures_are_reported_per_resource() {
    let h = harness();
    let (status, body) = h
        .call(
            "GET",
            "/orchestration/automated-teller-machines/CL-404",
            true,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(source_description(&body), "Failed to fetch ATM data");

    let (status, body) = h
        .call("GET", "/orchestration/presential-channels/SUC-1", true, None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        source_description(&body),
        "Failed to fetch Presential Channel data"
    );
}

#[tokio::test]
async fn orchestration_requires_traceability() {
    let h = harness();
    let (status, _) = h
        .call(
            "GET",
            "/orchestration/automated-teller-machines/CL-900",
            false,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.upstream.requests().is_empty());
}

#[tokio::test]
async fn init_seeds_repositories_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(&seed, r#"{"atms": [{"id": 5, "atmidentifier": "ATM-5"}]}"#).unwrap();
    let module = ServiceChannels::init(ServiceChannelsConfig {
        seed_file: Some(seed),
        api_prefix: "/".to_owned(),
        ..ServiceChannelsConfig::default()
    })
    .await
    .unwrap();

    let app = apply_contract_layers(
        module.router(Arc::new(TraceabilityRules::default())),
        &ContractLayerConfig::default(),
    );
    let mut builder = Request::builder().uri("/atms/5");
    for (name, value) in TRACE_HEADERS {
        builder = builder.header(name, value);
    }
    let resp = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body["Result"]["data"]["atmidentifier"], "ATM-5");
}

#[tokio::test]
async fn init_rejects_seed_without_room_for_new_ids() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    std::fs::write(
        &seed,
        r#"{"atms": [{"id": 9223372036854775807, "atmidentifier": "ATM-MAX"}]}"#,
    )
    .unwrap();
    let err = ServiceChannels::init(ServiceChannelsConfig {
        seed_file: Some(seed),
        ..ServiceChannelsConfig::default()
    })
    .await
    .err()
    .expect("seed must be rejected");
    assert_eq!(
        format!("{err:#}"),
        "invalid seed data: seeded ATM id 9223372036854775807 leaves no id for new records"
    );
}

#[tokio::test]
async fn init_rejects_invalid_config() {
    let res = ServiceChannels::init(ServiceChannelsConfig {
        topics: vec![String::new()],
        ..ServiceChannelsConfig::default()
    })
    .await;
    assert!(res.is_err());
}
