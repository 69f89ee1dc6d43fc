use cim_client::{CIMInstanceName, CIMScalar, ConnectionBuilder, HttpExchange, PywbemRequest, PywbemResponse, ReplayCase, WbemConnection};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

fn setup_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap()
}

fn person_path(name: &str) -> CIMInstanceName {
    CIMInstanceName::new("PyWBEM_Person").with_key("Name", CIMScalar::String(name.to_string()))
}

/// A canned `GetInstance` reply carrying `property_count` string properties.
fn get_instance_reply_xml(property_count: usize) -> String {
    let mut properties = String::new();
    for i in 0..property_count {
        properties.push_str(&format!(
            r#"<PROPERTY NAME="Prop{i}" TYPE="string"><VALUE>value-{i}</VALUE></PROPERTY>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="0" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE><INSTANCE CLASSNAME="PyWBEM_Person">{properties}</INSTANCE></IRETURNVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#
    )
}

fn replay_case(reply_xml: String) -> ReplayCase {
    ReplayCase {
        name: "bench".to_string(),
        description: "codec benchmark fixture".to_string(),
        pywbem_request: PywbemRequest {
            url: "http://acme.com:5988".to_string(),
            creds: None,
            namespace: None,
            timeout: 10,
            debug: false,
            stats_enabled: false,
            operation: serde_yaml::Value::Null,
        },
        pywbem_response: PywbemResponse::default(),
        http_request: HttpExchange {
            verb: Some("POST".to_string()),
            url: None,
            status: None,
            headers: Default::default(),
            data: String::new(),
        },
        http_response: HttpExchange {
            verb: None,
            url: None,
            status: Some(200),
            headers: Default::default(),
            data: reply_xml,
        },
    }
}

/// Encoding throughput: a `GetInstance` request for a single-key instance
/// path, via the connection's real call path, replayed against a fixed
/// response so the measured time is dominated by request encoding.
fn benchmark_encode_get_instance(c: &mut Criterion) {
    let rt = setup_runtime();
    let config = ConnectionBuilder::new("http://acme.com:5988")
        .unwrap()
        .default_namespace("root/cimv2")
        .unwrap()
        .build();
    let conn = WbemConnection::new(config).unwrap();
    rt.block_on(conn.enable_replay(replay_case(get_instance_reply_xml(2))));

    c.bench_function("encode_get_instance_request", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(conn.get_instance(&person_path("Fritz"), false, false, false, None).await.unwrap())
            })
        });
    });
}

/// Decoding throughput as a function of instance property count: the
/// request side is held constant, only the canned reply's size varies.
fn benchmark_decode_get_instance_by_property_count(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("decode_get_instance_reply");

    for property_count in [1, 10, 100, 1_000].iter() {
        let config = ConnectionBuilder::new("http://acme.com:5988")
            .unwrap()
            .default_namespace("root/cimv2")
            .unwrap()
            .build();
        let conn = WbemConnection::new(config).unwrap();
        rt.block_on(conn.enable_replay(replay_case(get_instance_reply_xml(*property_count))));

        group.bench_with_input(BenchmarkId::from_parameter(property_count), property_count, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(conn.get_instance(&person_path("Fritz"), false, false, false, None).await.unwrap())
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_encode_get_instance, benchmark_decode_get_instance_by_property_count);
criterion_main!(benches);
