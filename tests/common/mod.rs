//! Shared test support: a [`Recorder`] that captures the exact bytes sent
//! to the transport layer, so tests can assert on wire shape without a
//! live server.

use std::sync::{Arc, Mutex};

use cim_client::Recorder;

/// Captures every staged HTTP request body this connection produced, in
/// order, so tests can assert on wire shape and on transport-call count
/// without a live server.
#[derive(Clone, Default)]
pub struct CapturingRecorder {
    pub requests: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl CapturingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_request(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Recorder for CapturingRecorder {
    fn staged_request(&mut self, _method: &str, _namespace: &str) {}

    fn staged_http_request(&mut self, body: &[u8], _headers: &[(String, String)]) {
        self.requests.lock().unwrap().push(body.to_vec());
    }

    fn staged_http_reply(&mut self, _body: &[u8], _headers: &[(String, String)]) {}

    fn staged_reply(&mut self, _outcome: Result<&str, &str>) {}
}

/// Build a minimal, well-formed `IMETHODRESPONSE` carrying one instance
/// with `Name`/`Address` string properties, matching the GetInstance
/// happy-path scenario's shape.
pub fn get_instance_reply_xml(classname: &str, name: &str, address: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="0" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><IRETURNVALUE><INSTANCE CLASSNAME="{classname}"><PROPERTY NAME="Name" TYPE="string"><VALUE>{name}</VALUE></PROPERTY><PROPERTY NAME="Address" TYPE="string"><VALUE>{address}</VALUE></PROPERTY></INSTANCE></IRETURNVALUE></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#
    )
}

/// Build an `IMETHODRESPONSE` carrying a DMTF `<ERROR>` element.
pub fn error_reply_xml(code: u32, description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="0" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="GetInstance"><ERROR CODE="{code}" DESCRIPTION="{description}"/></IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#
    )
}

/// Build an `IMETHODRESPONSE` for an `Open*` call: no instances, the given
/// `EndOfSequence`/`EnumerationContext` output parameters.
pub fn open_enumeration_reply_xml(method: &str, end_of_sequence: bool, context: &str) -> String {
    let eos = if end_of_sequence { "TRUE" } else { "FALSE" };
    let context_param = if end_of_sequence {
        String::new()
    } else {
        format!(
            r#"<PARAMVALUE NAME="EnumerationContext" PARAMTYPE="string"><VALUE>{context}</VALUE></PARAMVALUE>"#
        )
    };
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><CIM CIMVERSION="2.0" DTDVERSION="2.0"><MESSAGE ID="0" PROTOCOLVERSION="1.0"><SIMPLERSP><IMETHODRESPONSE NAME="{method}"><PARAMVALUE NAME="EndOfSequence" PARAMTYPE="boolean"><VALUE>{eos}</VALUE></PARAMVALUE>{context_param}</IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#
    )
}

/// A canned [`cim_client::ReplayCase`] whose `http_response.data` is `reply_xml`.
pub fn replay_case(name: &str, reply_xml: impl Into<String>) -> cim_client::ReplayCase {
    use cim_client::{HttpExchange, PywbemRequest, PywbemResponse, ReplayCase};

    ReplayCase {
        name: name.to_string(),
        description: format!("canned case for {name}"),
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
            data: reply_xml.into(),
        },
    }
}
