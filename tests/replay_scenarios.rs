//! End-to-end scenarios driven through [`cim_client::WbemConnection::enable_replay`],
//! covering the connection's operation surface against canned CIMOM replies.

mod common;

use cim_client::{CIMInstanceName, CIMScalar, ConnectionBuilder, Namespace, WbemConnection};
use common::{error_reply_xml, get_instance_reply_xml, replay_case, CapturingRecorder};

fn person_path(name: &str) -> CIMInstanceName {
    CIMInstanceName::new("PyWBEM_Person").with_key("Name", CIMScalar::String(name.to_string()))
}

#[tokio::test]
async fn get_instance_happy_path() {
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("root/cimv2")
        .unwrap()
        .build();
    let conn = WbemConnection::new(config).unwrap();
    conn.enable_replay(replay_case(
        "get_instance_happy_path",
        get_instance_reply_xml("PyWBEM_Person", "Fritz", "Fritz Town"),
    ))
    .await;

    let instance = conn
        .get_instance(&person_path("Fritz"), false, false, false, None)
        .await
        .unwrap();

    assert_eq!(instance.classname(), "PyWBEM_Person");
    let name = instance.property("Name").unwrap();
    assert_eq!(name.value().unwrap().to_string(), "Fritz");
    assert!(!name.propagated());
    let address = instance.property("Address").unwrap();
    assert_eq!(address.value().unwrap().to_string(), "Fritz Town");
    assert!(!address.propagated());
}

#[tokio::test]
async fn get_instance_with_stats_records_exact_byte_lengths() {
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("root/cimv2")
        .unwrap()
        .stats_enabled(true)
        .build();
    let conn = WbemConnection::new(config).unwrap();
    let recorder = CapturingRecorder::new();
    conn.set_recorder(Box::new(recorder.clone())).await;
    let reply_xml = get_instance_reply_xml("PyWBEM_Person", "Fritz", "Fritz Town");
    let reply_len = reply_xml.len() as u64;
    conn.enable_replay(replay_case("get_instance_with_stats", reply_xml)).await;

    conn.get_instance(&person_path("Fritz"), false, false, false, None)
        .await
        .unwrap();

    let request_len = recorder.last_request().unwrap().len() as u64;
    let stats = conn.statistics().await;
    let method_stats = stats.get("GetInstance").expect("GetInstance stats recorded");
    assert_eq!(method_stats.count, 1);
    assert_eq!(method_stats.exception_count, 0);
    assert_eq!(method_stats.request_len_sum, request_len);
    assert_eq!(method_stats.reply_len_sum, reply_len);
}

#[tokio::test]
async fn access_denied_maps_to_cim_error_code_two() {
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("root/cimv2")
        .unwrap()
        .build();
    let conn = WbemConnection::new(config).unwrap();
    conn.enable_replay(replay_case(
        "access_denied",
        error_reply_xml(2, "Access is denied"),
    ))
    .await;

    let err = conn
        .get_instance(&person_path("Fritz"), false, false, false, None)
        .await
        .unwrap_err();

    assert!(err.is_access_denied());
    match err {
        cim_client::WbemError::Cim { code, .. } => {
            assert_eq!(code.0, 2);
            assert_eq!(code.mnemonic(), Some("CIM_ERR_ACCESS_DENIED"));
        }
        other => panic!("expected WbemError::Cim, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_namespace_request_carries_both_namespace_segments() {
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("root/bad")
        .unwrap()
        .build();
    let conn = WbemConnection::new(config).unwrap();
    let recorder = CapturingRecorder::new();
    conn.set_recorder(Box::new(recorder.clone())).await;
    conn.enable_replay(replay_case(
        "invalid_namespace",
        error_reply_xml(3, "Namespace root/bad does not exist"),
    ))
    .await;

    let err = conn
        .get_instance(&person_path("Fritz"), false, false, false, None)
        .await
        .unwrap_err();

    match err {
        cim_client::WbemError::Cim { code, .. } => assert_eq!(code.0, 3),
        other => panic!("expected WbemError::Cim, got {other:?}"),
    }
    let request = recorder.last_request().unwrap();
    assert!(
        request.contains(r#"<NAMESPACE NAME="root"/><NAMESPACE NAME="bad"/>"#),
        "request did not carry the expected namespace path: {request}"
    );
}

#[tokio::test]
async fn namespace_normalization_produces_exact_wire_form() {
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("//root/mycim//")
        .unwrap()
        .build();
    let conn = WbemConnection::new(config).unwrap();
    let recorder = CapturingRecorder::new();
    conn.set_recorder(Box::new(recorder.clone())).await;
    conn.enable_replay(replay_case(
        "namespace_normalization",
        get_instance_reply_xml("PyWBEM_Person", "Fritz", "Fritz Town"),
    ))
    .await;

    let instance = conn
        .get_instance(&person_path("Fritz"), false, false, false, None)
        .await
        .unwrap();

    let request = recorder.last_request().unwrap();
    assert!(request.contains(r#"<NAMESPACE NAME="root"/><NAMESPACE NAME="mycim"/>"#));
    assert_eq!(
        instance.path().and_then(|p| p.namespace()).map(Namespace::as_str),
        Some("root/mycim")
    );
}

#[tokio::test]
async fn path_on_object_namespace_produces_same_wire_form_as_default_namespace() {
    let config = ConnectionBuilder::new("http://acme.com:5988").unwrap().build();
    let conn = WbemConnection::new(config).unwrap();
    let recorder = CapturingRecorder::new();
    conn.set_recorder(Box::new(recorder.clone())).await;
    conn.enable_replay(replay_case(
        "path_on_object_namespace",
        get_instance_reply_xml("PyWBEM_Person", "Fritz", "Fritz Town"),
    ))
    .await;

    let path = person_path("Fritz").with_namespace(Namespace::normalize("//root/mycim//").unwrap());
    let instance = conn.get_instance(&path, false, false, false, None).await.unwrap();

    let request = recorder.last_request().unwrap();
    assert!(request.contains(r#"<NAMESPACE NAME="root"/><NAMESPACE NAME="mycim"/>"#));
    assert_eq!(
        instance.path().and_then(|p| p.namespace()).map(Namespace::as_str),
        Some("root/mycim")
    );
}
