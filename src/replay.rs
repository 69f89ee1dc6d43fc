// Copyright 2025 Cowboy AI, LLC.

//! Recorder / replay testing interface.
//!
//! The engine invokes a [`Recorder`]'s four observation points for every
//! operation. [`YamlRecorder`] captures them into a [`ReplayCase`] that can
//! be serialized to YAML; [`ReplayRecorder`] loads a canned case back and
//! hands its HTTP response straight to the decoder, bypassing the
//! transport so scenario tests run deterministically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{WbemError, WbemResult};

/// Observes an operation's four stages. Recorders are given values, never
/// mutable references — they cannot alter the request or reply in flight.
pub trait Recorder: Send {
    /// The operation is about to be dispatched.
    fn staged_request(&mut self, method: &str, namespace: &str);
    /// The encoded request body and headers are about to be sent.
    fn staged_http_request(&mut self, body: &[u8], headers: &[(String, String)]);
    /// The raw HTTP response body and headers were received.
    fn staged_http_reply(&mut self, body: &[u8], headers: &[(String, String)]);
    /// The operation concluded; `outcome` is a human-readable rendering
    /// of the decoded result (`Ok`) or the raised error's message (`Err`).
    fn staged_reply(&mut self, outcome: Result<&str, &str>);
}

/// A recorder that does nothing; the default when no recorder is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn staged_request(&mut self, _method: &str, _namespace: &str) {}
    fn staged_http_request(&mut self, _body: &[u8], _headers: &[(String, String)]) {}
    fn staged_http_reply(&mut self, _body: &[u8], _headers: &[(String, String)]) {}
    fn staged_reply(&mut self, _outcome: Result<&str, &str>) {}
}

/// One side of an HTTP exchange in a replay file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpExchange {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub data: String,
}

/// The operation request side of a replay case. `operation` carries the
/// intrinsic method name plus its typed parameters as a loosely-typed YAML
/// value — the replay format's `pywbem_method`/parameter fields are
/// whatever shape the scenario needs, not fixed ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PywbemRequest {
    pub url: String,
    #[serde(default)]
    pub creds: Option<(String, String)>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub timeout: u64,
    #[serde(default)]
    pub debug: bool,
    #[serde(rename = "stats-enabled", default)]
    pub stats_enabled: bool,
    pub operation: serde_yaml::Value,
}

/// The expected-outcome side of a replay case: either a successful result
/// tree or an expected CIM status code, with optional stats assertions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PywbemResponse {
    #[serde(default)]
    pub result: Option<serde_yaml::Value>,
    #[serde(default)]
    pub cim_status: Option<u32>,
    #[serde(default)]
    pub request_len: Option<u64>,
    #[serde(default)]
    pub reply_len: Option<u64>,
}

/// One complete replay test case: a recorded operation, its pywbem-shaped
/// request/response, and the raw HTTP exchange that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayCase {
    pub name: String,
    pub description: String,
    pub pywbem_request: PywbemRequest,
    pub pywbem_response: PywbemResponse,
    pub http_request: HttpExchange,
    pub http_response: HttpExchange,
}

/// Parse a replay file (a YAML sequence of [`ReplayCase`] records).
pub fn load_replay_file(yaml: &str) -> WbemResult<Vec<ReplayCase>> {
    serde_yaml::from_str(yaml).map_err(|e| WbemError::model(format!("invalid replay file: {e}")))
}

/// Serialize a set of cases back to a replay file.
pub fn save_replay_file(cases: &[ReplayCase]) -> WbemResult<String> {
    serde_yaml::to_string(cases).map_err(|e| WbemError::model(format!("cannot serialize replay file: {e}")))
}

/// Records one operation's four observation points into a [`ReplayCase`].
pub struct YamlRecorder {
    name: String,
    description: String,
    request: PywbemRequest,
    http_request: Option<HttpExchange>,
    http_response: Option<HttpExchange>,
    result: Option<serde_yaml::Value>,
}

impl YamlRecorder {
    /// Start recording a case named `name`, against `url`, with the given
    /// connection-level parameters (mirrors the fields a `pywbem_request`
    /// carries).
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        timeout_secs: u64,
        stats_enabled: bool,
        operation: serde_yaml::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            request: PywbemRequest {
                url: url.into(),
                creds: None,
                namespace: None,
                timeout: timeout_secs,
                debug: false,
                stats_enabled,
                operation,
            },
            http_request: None,
            http_response: None,
            result: None,
        }
    }

    /// Builder-style: record the credentials used.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.request.creds = Some((user.into(), password.into()));
        self
    }

    /// Builder-style: record the effective namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.request.namespace = Some(namespace.into());
        self
    }

    /// Finish recording and produce the completed case.
    pub fn finish(self) -> WbemResult<ReplayCase> {
        let http_request = self
            .http_request
            .ok_or_else(|| WbemError::model("recorder finished without an HTTP request"))?;
        let http_response = self
            .http_response
            .ok_or_else(|| WbemError::model("recorder finished without an HTTP response"))?;
        Ok(ReplayCase {
            name: self.name,
            description: self.description,
            pywbem_request: self.request,
            pywbem_response: PywbemResponse {
                result: self.result,
                cim_status: None,
                request_len: Some(http_request.data.len() as u64),
                reply_len: Some(http_response.data.len() as u64),
            },
            http_request,
            http_response,
        })
    }
}

impl Recorder for YamlRecorder {
    fn staged_request(&mut self, _method: &str, _namespace: &str) {}

    fn staged_http_request(&mut self, body: &[u8], headers: &[(String, String)]) {
        self.http_request = Some(HttpExchange {
            verb: Some("POST".to_string()),
            url: Some(self.request.url.clone()),
            status: None,
            headers: headers.iter().cloned().collect(),
            data: String::from_utf8_lossy(body).into_owned(),
        });
    }

    fn staged_http_reply(&mut self, body: &[u8], headers: &[(String, String)]) {
        let status = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("status"))
            .and_then(|(_, v)| v.parse().ok());
        self.http_response = Some(HttpExchange {
            verb: None,
            url: None,
            status,
            headers: headers.iter().cloned().collect(),
            data: String::from_utf8_lossy(body).into_owned(),
        });
    }

    fn staged_reply(&mut self, outcome: Result<&str, &str>) {
        if let Ok(rendered) = outcome {
            self.result = Some(serde_yaml::Value::String(rendered.to_string()));
        }
    }
}

/// Replays a single canned [`ReplayCase`]: hands its `http_response.data`
/// straight back as the transport reply, bypassing the network entirely.
pub struct ReplayRecorder {
    case: ReplayCase,
}

impl ReplayRecorder {
    /// Wrap a case for replay.
    pub fn new(case: ReplayCase) -> Self {
        Self { case }
    }

    /// The case being replayed.
    pub fn case(&self) -> &ReplayCase {
        &self.case
    }

    /// The canned response body this case specifies.
    pub fn canned_http_reply(&self) -> Vec<u8> {
        self.case.http_response.data.clone().into_bytes()
    }

    /// The canned response status (200 if unspecified).
    pub fn expected_status(&self) -> u16 {
        self.case.http_response.status.unwrap_or(200)
    }
}

impl Recorder for ReplayRecorder {
    fn staged_request(&mut self, _method: &str, _namespace: &str) {}
    fn staged_http_request(&mut self, _body: &[u8], _headers: &[(String, String)]) {}
    fn staged_http_reply(&mut self, _body: &[u8], _headers: &[(String, String)]) {}
    fn staged_reply(&mut self, _outcome: Result<&str, &str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
- name: get_instance_happy_path
  description: GetInstance returns an instance with two properties
  pywbem_request:
    url: "http://acme.com:5988"
    creds: ["user", "pw"]
    namespace: "root/cimv2"
    timeout: 10
    stats-enabled: false
    operation:
      pywbem_method: GetInstance
  pywbem_response:
    result:
      pywbem_object: CIMInstance
      classname: PyWBEM_Person
  http_request:
    verb: POST
    url: "http://acme.com:5988/cimom"
    headers: {}
    data: "<CIM/>"
  http_response:
    status: 200
    headers: {}
    data: "<CIM/>"
"#
    }

    #[test]
    fn loads_a_replay_case() {
        let cases = load_replay_file(sample_yaml()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "get_instance_happy_path");
        assert_eq!(cases[0].pywbem_request.namespace.as_deref(), Some("root/cimv2"));
    }

    #[test]
    fn replay_recorder_returns_canned_body() {
        let cases = load_replay_file(sample_yaml()).unwrap();
        let replay = ReplayRecorder::new(cases.into_iter().next().unwrap());
        assert_eq!(replay.canned_http_reply(), b"<CIM/>".to_vec());
        assert_eq!(replay.expected_status(), 200);
    }

    #[test]
    fn yaml_recorder_round_trips_through_save_and_load() {
        let mut recorder = YamlRecorder::new(
            "test_case",
            "a test",
            "http://acme.com:5988",
            10,
            true,
            serde_yaml::Value::String("GetInstance".to_string()),
        );
        recorder.staged_http_request(b"<CIM/>", &[]);
        recorder.staged_http_reply(b"<CIM/>", &[("status".to_string(), "200".to_string())]);
        recorder.staged_reply(Ok("instance of PyWBEM_Person {}"));
        let case = recorder.finish().unwrap();
        let yaml = save_replay_file(&[case]).unwrap();
        let reloaded = load_replay_file(&yaml).unwrap();
        assert_eq!(reloaded[0].name, "test_case");
        assert_eq!(reloaded[0].pywbem_response.request_len, Some(6));
    }
}
