// Copyright 2025 Cowboy AI, LLC.

//! HTTP transport: POST CIM-XML bodies to a CIMOM, with Basic/Digest
//! authentication, a combined connect+send+receive timeout, and a single
//! connection-reset retry for idempotent operations.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::auth::{basic_auth_header, digest_auth_header, DigestChallenge};
use crate::config::ClientConfig;
use crate::error::{WbemError, WbemResult};

const USER_AGENT: &str = concat!("cim-client/", env!("CARGO_PKG_VERSION"));

/// True for the intrinsic method names the transport may retry once on a
/// connection reset: `Get*`, `Enumerate*`, `Pull*`, `Close*`, and the
/// association-traversal family, which share the same read-only contract.
pub(crate) fn is_idempotent(method: &str) -> bool {
    let lower = method.to_ascii_lowercase();
    lower.starts_with("get")
        || lower.starts_with("enumerate")
        || lower.starts_with("pull")
        || lower.starts_with("close")
        || lower.starts_with("associator")
        || lower.starts_with("reference")
}

/// A decoded, length-instrumented HTTP reply body.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub body: Vec<u8>,
    pub server_time: Option<Duration>,
    pub request_len: u64,
    pub reply_len: u64,
}

/// Build the blocking `reqwest::Client` a [`crate::engine::WbemConnection`]
/// reuses across requests.
pub(crate) fn build_client(config: &ClientConfig) -> WbemResult<Client> {
    Client::builder()
        .danger_accept_invalid_certs(!config.tls_verify)
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .gzip(config.accept_compressed)
        .build()
        .map_err(WbemError::from)
}

/// Percent-encode the characters that would otherwise make `s` an invalid
/// header value (quotes and non-ASCII); everything else — including the
/// `/` and `:` that namespace and path strings are built from — passes
/// through unencoded, per DSP0200 §C's object-path encoding.
fn encode_cim_object(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'"' | b'%' | b'\\' => out.push_str(&format!("%{b:02X}")),
            0x00..=0x1F | 0x7F..=0xFF => out.push_str(&format!("%{b:02X}")),
            _ => out.push(b as char),
        }
    }
    out
}

/// POST `body` as a CIM-XML request for `method` against `cim_object`
/// (the namespace or object path the operation targets), handling
/// authentication, the single idempotent-retry, and response validation.
pub(crate) fn send(
    http: &Client,
    config: &ClientConfig,
    method: &str,
    cim_object: &str,
    body: Vec<u8>,
) -> WbemResult<TransportReply> {
    let url = config.url.join(&config.cimom_path)?;
    let request_len = body.len() as u64;
    let cim_object_encoded = encode_cim_object(cim_object);

    let attempt = |auth_header: Option<String>| -> WbemResult<Response> {
        let mut req = http
            .post(url.clone())
            .header("Content-Type", r#"application/xml; charset="utf-8""#)
            .header("Content-Length", request_len.to_string())
            .header("CIMOperation", "MethodCall")
            .header("CIMMethod", method)
            .header("CIMObject", cim_object_encoded.as_str())
            .body(body.clone());
        if let Some(header) = auth_header {
            req = req.header(reqwest::header::AUTHORIZATION, header);
        }
        req.send().map_err(WbemError::from)
    };

    let basic_header = config
        .credentials
        .as_ref()
        .map(|c| basic_auth_header(&c.user, &c.password));

    let mut response = match attempt(basic_header.clone()) {
        Ok(r) => r,
        Err(e) if e.is_connection() && is_idempotent(method) => {
            tracing::warn!(error = %e, method, "connection reset, retrying idempotent operation");
            attempt(basic_header.clone())?
        }
        Err(e) => return Err(e),
    };

    if response.status().as_u16() == 401 {
        let challenge = response
            .headers()
            .get(reqwest::header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(DigestChallenge::parse);
        match challenge {
            Some(challenge) => {
                let creds = config.credentials.as_ref().ok_or_else(|| {
                    WbemError::Auth(
                        "server requires authentication but no credentials are configured".to_string(),
                    )
                })?;
                let cnonce = uuid::Uuid::new_v4().simple().to_string();
                let digest_header = digest_auth_header(
                    &challenge,
                    &creds.user,
                    &creds.password,
                    "POST",
                    &config.cimom_path,
                    &cnonce,
                    1,
                );
                response = attempt(Some(digest_header))?;
                if response.status().as_u16() == 401 {
                    return Err(WbemError::Auth("digest authentication was rejected".to_string()));
                }
            }
            None => {
                return Err(WbemError::Auth(
                    "server returned 401 with no further credential available".to_string(),
                ))
            }
        }
    }

    let status = response.status();
    let server_time = response
        .headers()
        .get("WBEMServerResponseTime")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|micros| Duration::from_secs_f64(micros / 1_000_000.0));

    if let Some(server_date) = response
        .headers()
        .get(reqwest::header::DATE)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| httpdate::parse_http_date(s).ok())
    {
        let skew = server_date.elapsed().unwrap_or_default();
        tracing::debug!(?skew, "server clock skew relative to local time");
    }

    let response_operation = response
        .headers()
        .get("CIMOperation")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !status.is_success() {
        return Err(WbemError::Http {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown status").to_string(),
        });
    }

    match response_operation {
        Some(v) if v.eq_ignore_ascii_case("MethodResponse") => {}
        _ => {
            return Err(WbemError::Connection(
                "response missing required header CIMOperation: MethodResponse".to_string(),
            ))
        }
    }

    let body_bytes = response.bytes().map_err(WbemError::from)?.to_vec();
    let reply_len = body_bytes.len() as u64;

    Ok(TransportReply {
        body: body_bytes,
        server_time,
        request_len,
        reply_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_methods_are_recognized() {
        assert!(is_idempotent("GetInstance"));
        assert!(is_idempotent("EnumerateInstanceNames"));
        assert!(is_idempotent("PullInstancesWithPath"));
        assert!(is_idempotent("CloseEnumeration"));
        assert!(!is_idempotent("CreateInstance"));
        assert!(!is_idempotent("ModifyInstance"));
        assert!(!is_idempotent("DeleteInstance"));
    }

    #[test]
    fn cim_object_encoding_escapes_quotes_and_leaves_slashes() {
        let encoded = encode_cim_object(r#"root/cimv2:PyWBEM_Person.Name="Fritz""#);
        assert!(encoded.contains("root/cimv2"));
        assert!(!encoded.contains('"'));
        assert!(encoded.contains("%22"));
    }
}
